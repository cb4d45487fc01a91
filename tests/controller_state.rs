mod common;

use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use servo_panel::controller::ServoController;
use common::{LinkScript, ScriptedLink};

fn connected_controller(script: LinkScript) -> (ServoController, ScriptedLinkHandles) {
    let link = ScriptedLink::new(script);
    let handles = ScriptedLinkHandles {
        sent: link.sent.clone(),
        closed: link.closed.clone(),
    };
    (ServoController::with_link(Box::new(link), "COM5"), handles)
}

struct ScriptedLinkHandles {
    sent: std::sync::Arc<std::sync::Mutex<Vec<u8>>>,
    closed: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

#[tokio::test]
async fn acknowledged_position_updates_status() {
    let (controller, handles) = connected_controller(LinkScript::Ack);

    let outcome = controller.set_position(9).await;
    assert!(outcome.success);
    assert_eq!(outcome.position, 9);
    assert!(outcome.is_vibrating);

    let status = controller.status().await;
    assert!(status.connected);
    assert_eq!(status.position, 9);
    assert!(status.is_vibrating);
    assert_eq!(*handles.sent.lock().unwrap(), vec![9]);
}

#[tokio::test]
async fn vibration_window_expires_after_five_seconds() {
    let (controller, _handles) = connected_controller(LinkScript::Ack);
    let start = Instant::now();

    let outcome = controller.set_position_at(9, start).await;
    assert!(outcome.success);

    let just_inside = controller
        .status_at(start + Duration::from_millis(4900))
        .await;
    assert!(just_inside.is_vibrating);

    let just_outside = controller
        .status_at(start + Duration::from_millis(5100))
        .await;
    assert!(!just_outside.is_vibrating);
    assert_eq!(just_outside.position, 9);
}

#[tokio::test]
async fn rejected_response_leaves_state_unchanged() {
    let (controller, _handles) = connected_controller(LinkScript::Nak);

    let outcome = controller.set_position(7).await;
    assert!(!outcome.success);
    assert!(!outcome.is_vibrating);

    let status = controller.status().await;
    // A failed send does not tear down the connection.
    assert!(status.connected);
    assert_eq!(status.position, 0);
    assert!(!status.is_vibrating);
}

#[tokio::test]
async fn transport_error_reports_failure_without_disconnecting() {
    let (controller, _handles) = connected_controller(LinkScript::Fail);

    let outcome = controller.set_position(3).await;
    assert!(!outcome.success);

    let status = controller.status().await;
    assert!(status.connected);
    assert_eq!(status.position, 0);
}

#[tokio::test]
async fn out_of_range_position_is_rejected_before_sending() {
    let (controller, handles) = connected_controller(LinkScript::Ack);

    let outcome = controller.set_position(16).await;
    assert!(!outcome.success);
    assert!(handles.sent.lock().unwrap().is_empty());

    let status = controller.status().await;
    assert_eq!(status.position, 0);
    assert!(!status.is_vibrating);
}

#[tokio::test]
async fn set_position_without_connection_fails() {
    let controller = ServoController::new();

    let outcome = controller.set_position(5).await;
    assert!(!outcome.success);

    let status = controller.status().await;
    assert!(!status.connected);
    assert_eq!(status.position, 0);
}

#[tokio::test]
async fn disconnect_closes_the_link_and_is_idempotent() {
    let (controller, handles) = connected_controller(LinkScript::Ack);

    controller.disconnect().await;
    assert!(handles.closed.load(Ordering::SeqCst));
    assert_eq!(controller.connected_port().await, None);

    // Disconnecting again while already disconnected is still fine.
    controller.disconnect().await;
    let status = controller.status().await;
    assert!(!status.connected);
    assert_eq!(status.position, 0);
}

#[tokio::test]
async fn auto_connect_without_matching_ports_reports_not_found() {
    // No board is attached in the test environment, so auto-detection
    // must come back empty-handed without touching any port.
    let controller = ServoController::new();

    let outcome = controller.connect("auto").await;
    assert!(!outcome.success);
    assert_eq!(outcome.message.as_deref(), Some("Arduino not found"));
    assert_eq!(outcome.port, None);

    let status = controller.status().await;
    assert!(!status.connected);
}
