//! Built-in page catalogue of the kindergarten management app

/// `(route, name)` pairs per role, in inspection order
pub(super) const ADMIN_PAGES: &[(&str, &str)] = &[
    // System management
    ("/system/permissions", "权限管理"),
    ("/system/roles", "角色管理"),
    ("/system/Backup", "备份管理"),
    ("/system/AIModelConfig", "AI模型配置"),
    ("/system/MessageTemplate", "消息模板"),
    // Business centers
    ("/centers/ActivityCenter", "活动中心"),
    ("/centers/AnalyticsCenter", "数据分析中心"),
    ("/centers/AssessmentCenter", "评估中心"),
    ("/centers/AttendanceCenter", "考勤中心"),
    ("/centers/BusinessCenter", "业务中心"),
    ("/centers/CallCenter", "呼叫中心"),
    ("/centers/CustomerPoolCenter", "客户池中心"),
    ("/centers/DocumentCenter", "文档中心"),
    ("/centers/EnrollmentCenter", "招生中心"),
    ("/centers/FinanceCenter", "财务中心"),
    ("/centers/InspectionCenter", "检查中心"),
    ("/centers/MarketingCenter", "营销中心"),
    ("/centers/PersonnelCenter", "人员中心"),
    ("/centers/SystemCenter", "系统中心"),
    ("/centers/TaskCenter", "任务中心"),
    ("/centers/TeachingCenter", "教学中心"),
    ("/centers/UsageCenter", "用量中心"),
    ("/centers/AICenter", "AI智能中心"),
    ("/centers/AIBillingCenter", "AI计费中心"),
    // Mobile
    ("/mobile/centers/activity-center", "移动端活动中心"),
    ("/mobile/centers/analytics-center", "移动端数据分析中心"),
    ("/mobile/centers/assessment-center", "移动端评估中心"),
    ("/mobile/centers/attendance-center", "移动端考勤中心"),
    ("/mobile/centers/business-center", "移动端业务中心"),
    ("/mobile/centers/call-center", "移动端呼叫中心"),
    ("/mobile/centers/customer-pool-center", "移动端客户池中心"),
    ("/mobile/centers/document-center", "移动端文档中心"),
    ("/mobile/centers/enrollment-center", "移动端招生中心"),
    ("/mobile/centers/finance-center", "移动端财务中心"),
    ("/mobile/centers/inspection-center", "移动端检查中心"),
    ("/mobile/centers/marketing-center", "移动端营销中心"),
    ("/mobile/centers/task-center", "移动端任务中心"),
    ("/mobile/centers/teaching-center", "移动端教学中心"),
    ("/mobile/centers/usage-center", "移动端用量中心"),
    ("/mobile/centers/system-center", "移动端系统中心"),
    ("/mobile/centers/notification-center", "移动端通知中心"),
    ("/mobile/centers/permission-center", "移动端权限中心"),
    ("/mobile/centers/personnel-center", "移动端人员中心"),
    ("/mobile/centers/student-center", "移动端学生中心"),
];

pub(super) const PRINCIPAL_PAGES: &[(&str, &str)] = &[
    ("/principal/Dashboard", "园长仪表板"),
    ("/principal/CustomerPool", "园长客户池"),
    ("/principal/Performance", "园长绩效"),
    ("/principal/PosterGenerator", "海报生成器"),
    ("/principal/PosterTemplates", "海报模板"),
    ("/principal/ParentPermissionManagement", "家长权限管理"),
    ("/principal/decision-support/intelligent-dashboard", "智能决策仪表板"),
    ("/principal/media-center/VideoCreatorTimeline", "视频创作时间线"),
    // Centers visible to principals
    ("/centers/AnalyticsCenter", "数据分析中心"),
    ("/centers/BusinessCenter", "业务中心"),
    ("/centers/CallCenter", "呼叫中心"),
    ("/centers/CustomerPoolCenter", "客户池中心"),
    ("/centers/EnrollmentCenter", "招生中心"),
    ("/centers/FinanceCenter", "财务中心"),
    ("/centers/MarketingCenter", "营销中心"),
    ("/centers/TaskCenter", "任务中心"),
    ("/centers/TeachingCenter", "教学中心"),
    ("/centers/UsageCenter", "用量中心"),
    // Mobile
    ("/mobile/centers/analytics-hub", "移动端数据分析"),
    ("/mobile/centers/business-hub", "移动端业务中心"),
    ("/mobile/centers/call-center", "移动端呼叫中心"),
    ("/mobile/centers/customer-pool-center", "移动端客户池中心"),
    ("/mobile/centers/enrollment-center", "移动端招生中心"),
    ("/mobile/centers/finance-center", "移动端财务中心"),
    ("/mobile/centers/marketing-center", "移动端营销中心"),
    ("/mobile/centers/task-center", "移动端任务中心"),
];

pub(super) const TEACHER_PAGES: &[(&str, &str)] = &[
    ("/teacher-center/dashboard", "教师仪表板"),
    ("/teacher-center/activities", "活动管理"),
    ("/teacher-center/attendance", "考勤管理"),
    ("/teacher-center/tasks", "任务管理"),
    ("/teacher-center/tasks/create", "新建任务"),
    ("/teacher-center/tasks/detail", "任务详情"),
    ("/teacher-center/tasks/edit", "编辑任务"),
    ("/teacher-center/enrollment", "招生协助"),
    ("/teacher-center/customer-pool", "客户池"),
    ("/teacher-center/customer-tracking", "客户跟进"),
    ("/teacher-center/teaching", "教学工作"),
    ("/teacher-center/creative-curriculum", "创意课程"),
    ("/teacher-center/notifications", "通知消息"),
    ("/teacher-center/performance-rewards", "绩效奖励"),
    ("/teacher-center/class-contacts", "班级联系"),
    ("/teacher-center/appointment-management", "预约管理"),
    // Centers visible to teachers
    ("/centers/ActivityCenter", "活动中心"),
    ("/centers/AssessmentCenter", "评估中心"),
    ("/centers/AttendanceCenter", "考勤中心"),
    ("/centers/DocumentCenter", "文档中心"),
    ("/centers/InspectionCenter", "检查中心"),
    ("/centers/TaskCenter", "任务中心"),
    // Mobile
    ("/mobile/teacher-center/dashboard", "移动端教师仪表板"),
    ("/mobile/teacher-center/activities", "移动端活动管理"),
    ("/mobile/teacher-center/teaching", "移动端教学工作"),
    ("/mobile/teacher-center/attendance", "移动端考勤管理"),
    ("/mobile/teacher-center/customer-pool", "移动端客户池"),
    ("/mobile/teacher-center/customer-tracking", "移动端客户跟进"),
    ("/mobile/teacher-center/tasks", "移动端任务管理"),
    ("/mobile/teacher-center/tasks/create", "移动端新建任务"),
    ("/mobile/teacher-center/tasks/detail", "移动端任务详情"),
    ("/mobile/teacher-center/tasks/edit", "移动端编辑任务"),
    ("/mobile/teacher-center/performance-rewards", "移动端绩效奖励"),
    ("/mobile/teacher-center/notifications", "移动端通知消息"),
    ("/mobile/teacher-center/enrollment", "移动端招生协助"),
    ("/mobile/teacher-center/appointment-management", "移动端预约管理"),
    ("/mobile/teacher-center/class-contacts", "移动端班级联系"),
    ("/mobile/teacher-center/creative-curriculum", "移动端创意课程"),
];

pub(super) const PARENT_PAGES: &[(&str, &str)] = &[
    ("/parent-center/dashboard", "家长仪表板"),
    ("/parent-center/AIAssistant", "AI助手"),
    ("/parent-center/ai-assistant", "AI助手"),
    ("/parent-center/activities", "活动列表"),
    ("/parent-center/children", "孩子信息"),
    ("/parent-center/children/add", "添加孩子"),
    ("/parent-center/children/edit", "编辑孩子"),
    ("/parent-center/children/growth", "孩子成长"),
    ("/parent-center/children/followup", "孩子跟进"),
    ("/parent-center/assessment", "能力评估"),
    ("/parent-center/assessment/start", "开始测评"),
    ("/parent-center/assessment/doing", "测评进行中"),
    ("/parent-center/assessment/report", "测评报告"),
    ("/parent-center/assessment/development-assessment", "发育测评"),
    ("/parent-center/assessment/growth-trajectory", "成长轨迹"),
    ("/parent-center/child-growth", "成长记录"),
    ("/parent-center/communication", "家园沟通"),
    ("/parent-center/communication/smart-hub", "智能沟通"),
    ("/parent-center/notifications", "通知消息"),
    ("/parent-center/notifications/detail", "通知详情"),
    ("/parent-center/photo-album", "成长相册"),
    ("/parent-center/profile", "个人中心"),
    ("/parent-center/feedback", "意见反馈"),
    ("/parent-center/promotion-center", "推广中心"),
    ("/parent-center/share-stats", "分享统计"),
    // Games
    ("/parent-center/games", "亲子游戏"),
    ("/parent-center/games/records", "游戏记录"),
    ("/parent-center/games/achievements", "游戏成就"),
    ("/parent-center/kindergarten-rewards", "园所奖励"),
    // Mobile
    ("/mobile/parent-center", "移动端家长中心"),
    ("/mobile/parent-center/dashboard", "移动端家长仪表板"),
    ("/mobile/parent-center/activities", "移动端活动列表"),
    ("/mobile/parent-center/activities/detail", "移动端活动详情"),
    ("/mobile/parent-center/activity-registration", "移动端活动报名"),
    ("/mobile/parent-center/children", "移动端孩子信息"),
    ("/mobile/parent-center/child-growth", "移动端成长记录"),
    ("/mobile/parent-center/assessment", "移动端能力评估"),
    ("/mobile/parent-center/assessment/start", "移动端开始测评"),
    ("/mobile/parent-center/assessment/doing", "移动端测评进行中"),
    ("/mobile/parent-center/assessment/report", "移动端测评报告"),
    ("/mobile/parent-center/assessment/development-assessment", "移动端发育测评"),
    ("/mobile/parent-center/assessment/growth-trajectory", "移动端成长轨迹"),
    ("/mobile/parent-center/games", "移动端亲子游戏"),
    ("/mobile/parent-center/games/records", "移动端游戏记录"),
    ("/mobile/parent-center/games/achievements", "移动端游戏成就"),
    ("/mobile/parent-center/photo-album", "移动端成长相册"),
    ("/mobile/parent-center/communication", "移动端家园沟通"),
    ("/mobile/parent-center/communication/smart-hub", "移动端智能沟通"),
    ("/mobile/parent-center/notifications", "移动端通知消息"),
    ("/mobile/parent-center/notifications/detail", "移动端通知详情"),
    ("/mobile/parent-center/profile", "移动端个人中心"),
    ("/mobile/parent-center/feedback", "移动端意见反馈"),
    ("/mobile/parent-center/ai-assistant", "移动端AI助手"),
    ("/mobile/parent-center/promotion-center", "移动端推广中心"),
    ("/mobile/parent-center/share-stats", "移动端分享统计"),
    ("/mobile/parent-center/kindergarten-rewards", "移动端园所奖励"),
];

pub(super) const COMMON_PAGES: &[(&str, &str)] = &[
    ("/login", "登录页"),
    ("/register", "注册页"),
    ("/", "设备选择页"),
    ("/403", "403错误页"),
    ("/404", "404错误页"),
    ("/mobile/login", "移动端登录页"),
];

