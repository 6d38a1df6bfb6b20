//! Page inspector integration tests
//!
//! Drives the inspector against scripted browser sessions.

use site_health::core::{PageDescriptor, PageState, Role, RoleResult};
use site_health::driver::{PageScript, ScriptedDriver, SnapshotNode};
use site_health::inspect::{
    InspectionSettings, PageInspector, CONSOLE_ERROR_PREFIX, RENDER_FAILURE,
};

const BASE: &str = "http://localhost:5173";

fn inspector() -> PageInspector {
    PageInspector::default().with_settings(InspectionSettings::default().without_waits())
}

fn node(role: &str, name: &str, reference: &str) -> SnapshotNode {
    SnapshotNode::new(role).named(name).with_ref(reference)
}

fn document(children: Vec<SnapshotNode>) -> SnapshotNode {
    SnapshotNode::new("document").with_children(children)
}

fn login_page() -> SnapshotNode {
    document(vec![SnapshotNode::new("form").with_children(vec![
        node("textbox", "用户名", "e1"),
        node("textbox", "密码", "e2"),
        node("button", "登录", "e3"),
    ])])
}

/// Login renders and submits; dashboard renders nothing
#[tokio::test]
async fn test_login_and_dashboard_scenario() {
    let mut driver = ScriptedDriver::new(BASE)
        .with_page("/login", PageScript::rendered(login_page()))
        .with_page("/dashboard", PageScript::blank());
    let inspector = inspector();

    let login = PageDescriptor::new("/login", "登录页", Role::Admin);
    let status = inspector.inspect(BASE, &login, &mut driver).await;
    assert_eq!(status.route, "/login");
    assert_eq!(status.state, PageState::Completed);
    assert_eq!(status.error_count, 0);
    assert_eq!(driver.typed(), vec![("e1", "admin"), ("e2", "123456")]);
    assert_eq!(driver.clicks(), vec!["e3"]);

    let dashboard = PageDescriptor::new("/dashboard", "仪表板", Role::Admin);
    let failed = inspector.inspect(BASE, &dashboard, &mut driver).await;
    assert_eq!(failed.state, PageState::Failed);
    assert_eq!(failed.error_count, 1);
    assert_eq!(failed.error_details, vec![RENDER_FAILURE.to_string()]);

    let mut result = RoleResult::new(Role::Admin);
    assert!(result.record(status));
    assert!(result.record(failed));
    assert_eq!((result.total, result.completed, result.failed), (2, 1, 1));
}

#[tokio::test]
async fn test_error_page_filters_expected_status() {
    let page = document(vec![
        SnapshotNode::new("heading").named("404"),
        node("button", "返回首页", "e1"),
    ]);
    let mut driver = ScriptedDriver::new(BASE).with_page(
        "/404",
        PageScript::rendered(page).with_console_error("404 Not Found"),
    );

    let descriptor = PageDescriptor::new("/404", "404错误页", Role::Common);
    let status = inspector().inspect(BASE, &descriptor, &mut driver).await;

    assert_eq!(status.state, PageState::Completed);
    assert_eq!(status.console_error_count, 0);
    assert_eq!(driver.clicks(), vec!["e1"]);
}

#[tokio::test]
async fn test_error_page_keeps_genuine_errors() {
    let mut driver = ScriptedDriver::new(BASE).with_page(
        "/403",
        PageScript::rendered(document(vec![]))
            .with_console_error("GET /api/user 403 (Forbidden)")
            .with_console_error("TypeError: cannot read properties of undefined"),
    );

    let descriptor = PageDescriptor::new("/403", "403错误页", Role::Common);
    let status = inspector().inspect(BASE, &descriptor, &mut driver).await;

    assert_eq!(status.state, PageState::Failed);
    assert_eq!(status.error_count, 1);
    assert_eq!(
        status.error_details,
        vec![format!(
            "{}TypeError: cannot read properties of undefined",
            CONSOLE_ERROR_PREFIX
        )]
    );
}

#[tokio::test]
async fn test_error_page_keeps_errors_with_status_digits_inside() {
    let mut driver = ScriptedDriver::new(BASE).with_page(
        "/404",
        PageScript::rendered(document(vec![]))
            .with_console_error("404 Not Found")
            .with_console_error("Uncaught TypeError: x is undefined at app.js:4041"),
    );

    let descriptor = PageDescriptor::new("/404", "404错误页", Role::Common);
    let status = inspector().inspect(BASE, &descriptor, &mut driver).await;

    assert_eq!(status.state, PageState::Failed);
    assert_eq!(status.console_error_count, 1);
    assert!(status.error_details[0].ends_with("app.js:4041"));
}

#[tokio::test]
async fn test_status_text_counts_on_ordinary_pages() {
    let mut driver = ScriptedDriver::new(BASE).with_page(
        "/centers/TaskCenter",
        PageScript::rendered(document(vec![])).with_console_error("404 Not Found"),
    );

    let descriptor = PageDescriptor::new("/centers/TaskCenter", "任务中心", Role::Admin);
    let status = inspector().inspect(BASE, &descriptor, &mut driver).await;
    assert_eq!(status.state, PageState::Failed);
    assert_eq!(status.console_error_count, 1);
}

#[tokio::test]
async fn test_repeated_inspection_is_stable() {
    let page = document(vec![node("button", "刷新", "e1"), node("textbox", "搜索", "e2")]);
    let mut driver = ScriptedDriver::new(BASE)
        .with_page("/centers/TaskCenter", PageScript::rendered(page));
    let inspector = inspector();
    let descriptor = PageDescriptor::new("/centers/TaskCenter", "任务中心", Role::Admin);

    for _ in 0..3 {
        let status = inspector.inspect(BASE, &descriptor, &mut driver).await;
        assert_eq!(status.state, PageState::Completed);
        assert_eq!(status.error_count, 0);
        assert!(status.error_details.is_empty());
    }
}

#[tokio::test]
async fn test_failed_click_does_not_stop_interaction() {
    let page = document(vec![
        node("button", "按钮0", "e0"),
        node("button", "按钮1", "e1"),
        node("button", "按钮2", "e2"),
    ]);
    let mut driver = ScriptedDriver::new(BASE).with_page(
        "/system/roles",
        PageScript::rendered(page).failing_ref("e1"),
    );

    let descriptor = PageDescriptor::new("/system/roles", "角色管理", Role::Admin);
    let status = inspector().inspect(BASE, &descriptor, &mut driver).await;

    assert_eq!(driver.clicks(), vec!["e0", "e1", "e2"]);
    assert_eq!(status.state, PageState::Failed);
    assert_eq!(status.error_count, 1);
    assert!(status.error_details[0].starts_with("点击失败: 按钮1"));
}

#[tokio::test]
async fn test_error_count_sums_interaction_and_console() {
    let page = document(vec![node("button", "保存", "e1")]);
    let mut driver = ScriptedDriver::new(BASE).with_page(
        "/centers/FinanceCenter",
        PageScript::rendered(page)
            .failing_ref("e1")
            .with_console_error("Uncaught ReferenceError: chart is not defined")
            .with_console_error("Failed to load resource: 500")
            .with_console_warning("[Vue warn]: extraneous attribute"),
    );

    let descriptor = PageDescriptor::new("/centers/FinanceCenter", "财务中心", Role::Admin);
    let status = inspector().inspect(BASE, &descriptor, &mut driver).await;

    assert_eq!(status.state, PageState::Failed);
    assert_eq!(status.error_count, 3);
    assert_eq!(status.console_error_count, 2);
    assert_eq!(status.warning_count, 1);
    assert!(status.error_details[0].starts_with("点击失败"));
    assert!(status.error_details[1].starts_with(CONSOLE_ERROR_PREFIX));
    assert!(status.error_details[2].starts_with(CONSOLE_ERROR_PREFIX));
}

#[tokio::test]
async fn test_warnings_alone_do_not_fail() {
    let mut driver = ScriptedDriver::new(BASE).with_page(
        "/parent-center/dashboard",
        PageScript::rendered(document(vec![])).with_console_warning("deprecated API"),
    );

    let descriptor = PageDescriptor::new("/parent-center/dashboard", "家长仪表板", Role::Parent);
    let status = inspector().inspect(BASE, &descriptor, &mut driver).await;
    assert_eq!(status.state, PageState::Completed);
    assert_eq!(status.warning_count, 1);
}

#[tokio::test]
async fn test_navigation_error_becomes_failed_status() {
    let mut driver = ScriptedDriver::new(BASE).with_page(
        "/principal/Dashboard",
        PageScript::blank().failing_navigation("net::ERR_CONNECTION_REFUSED"),
    );

    let descriptor = PageDescriptor::new("/principal/Dashboard", "园长仪表板", Role::Principal);
    let status = inspector().inspect(BASE, &descriptor, &mut driver).await;

    assert_eq!(status.state, PageState::Failed);
    assert_eq!(status.error_count, 1);
    assert_eq!(status.error_details.len(), 1);
    assert!(status.error_details[0].contains("ERR_CONNECTION_REFUSED"));
    assert!(status.timestamp.is_some());
}

#[tokio::test]
async fn test_snapshot_error_becomes_failed_status() {
    let mut driver = ScriptedDriver::new(BASE).with_page(
        "/teacher-center/tasks",
        PageScript::rendered(document(vec![])).failing_snapshot("Timed out after 30000ms: snapshot"),
    );

    let descriptor = PageDescriptor::new("/teacher-center/tasks", "任务管理", Role::Teacher);
    let status = inspector().inspect(BASE, &descriptor, &mut driver).await;

    assert_eq!(status.state, PageState::Failed);
    assert_eq!(status.error_count, 1);
    assert!(status.error_details[0].contains("Timed out"));
}

#[tokio::test]
async fn test_login_without_button() {
    let page = document(vec![node("textbox", "用户名", "e1")]);
    let mut driver =
        ScriptedDriver::new(BASE).with_page("/mobile/login", PageScript::rendered(page));

    let descriptor = PageDescriptor::new("/mobile/login", "移动端登录页", Role::Common);
    let status = inspector().inspect(BASE, &descriptor, &mut driver).await;

    assert_eq!(status.state, PageState::Failed);
    assert_eq!(status.error_details, vec!["未找到登录按钮".to_string()]);
    assert_eq!(driver.typed(), vec![("e1", "admin")]);
}

#[tokio::test]
async fn test_registration_fills_synthetic_values() {
    let page = document(vec![
        node("textbox", "邮箱", "e1"),
        node("textbox", "密码", "e2"),
        node("textbox", "手机号", "e3"),
        node("textbox", "昵称", "e4"),
        node("button", "取消", "e5"),
        node("button", "立即注册", "e6"),
    ]);
    let mut driver = ScriptedDriver::new(BASE).with_page("/register", PageScript::rendered(page));

    let descriptor = PageDescriptor::new("/register", "注册页", Role::Common);
    let status = inspector().inspect(BASE, &descriptor, &mut driver).await;

    assert_eq!(status.state, PageState::Completed);
    let typed = driver.typed();
    assert_eq!(typed.len(), 3);
    assert!(typed[0].1.ends_with("@example.com"));
    assert_eq!(typed[1], ("e2", "123456"));
    assert!(typed[2].1.starts_with("138"));
    assert_eq!(driver.clicks(), vec!["e6"]);
}

#[tokio::test]
async fn test_device_selection_prefers_device_entries() {
    let page = document(vec![
        node("button", "关于我们", "e1"),
        node("button", "电脑端", "e2"),
        SnapshotNode::new("group").named("移动端").with_ref("e3"),
    ]);
    let mut driver = ScriptedDriver::new(BASE).with_page("/", PageScript::rendered(page));

    let descriptor = PageDescriptor::new("/", "设备选择页", Role::Common);
    let status = inspector().inspect(BASE, &descriptor, &mut driver).await;

    assert_eq!(status.state, PageState::Completed);
    assert_eq!(driver.clicks(), vec!["e2", "e3"]);
}

#[tokio::test]
async fn test_custom_click_limit() {
    let buttons = (0..4).map(|i| node("button", &format!("b{}", i), &format!("e{}", i)));
    let mut driver = ScriptedDriver::new(BASE).with_page(
        "/centers/CallCenter",
        PageScript::rendered(document(buttons.collect())),
    );

    let mut settings = InspectionSettings::default().without_waits();
    settings.max_clicks = 2;
    let inspector = PageInspector::default().with_settings(settings);

    let descriptor = PageDescriptor::new("/centers/CallCenter", "呼叫中心", Role::Admin);
    inspector.inspect(BASE, &descriptor, &mut driver).await;
    assert_eq!(driver.clicks(), vec!["e0", "e1"]);
}
