use gn10can_bus::CanBus;
use gn10can_devices::{
    EncoderType, GainKind, LimitSwitchConfig, MotorConfig, MotorDriverClient, MotorDriverServer,
    MotorFeedback, MotorSettings, SolenoidDriverClient, SolenoidDriverServer,
};
use gn10can_transport::MemoryDriver;

/// Controller and actuator on separate buses joined by a memory link.
fn link() -> (CanBus<MemoryDriver>, CanBus<MemoryDriver>) {
    let (controller, actuator) = MemoryDriver::pair();
    (CanBus::new(controller), CanBus::new(actuator))
}

#[test]
fn motor_setpoints_reach_the_actuator() {
    let (controller, actuator) = link();
    let client = MotorDriverClient::attach(&controller, 1).unwrap();
    let server = MotorDriverServer::attach(&actuator, 1).unwrap();

    let config = MotorConfig::from(MotorSettings {
        telemetry_cycle_ms: 10,
        encoder: EncoderType::Absolute,
        limit_switches: LimitSwitchConfig {
            forward_stop: true,
            forward_id: 1,
            ..LimitSwitchConfig::default()
        },
        ..MotorSettings::default()
    });

    {
        let client = client.borrow();
        client.send_init(&config).unwrap();
        client.send_target(123.45).unwrap();
        client.send_gain(GainKind::Kp, 1.5).unwrap();
        client.send_gain(GainKind::Ff, -0.5).unwrap();
    }

    let stats = actuator.update().unwrap();
    assert_eq!(stats.received, 4);
    assert_eq!(stats.delivered, 4);

    let mut server = server.borrow_mut();
    assert_eq!(server.take_init(), Some(config));
    assert_eq!(server.take_target().map(f32::to_bits), Some(123.45f32.to_bits()));
    assert_eq!(server.take_gain(GainKind::Kp), Some(1.5));
    assert_eq!(server.take_gain(GainKind::Ki), None);
    assert_eq!(server.take_gain(GainKind::Ff), Some(-0.5));
}

#[test]
fn motor_telemetry_reaches_the_controller() {
    let (controller, actuator) = link();
    let client = MotorDriverClient::attach(&controller, 2).unwrap();
    let server = MotorDriverServer::attach(&actuator, 2).unwrap();

    server.borrow().send_feedback(543.21, 0b0000_0010).unwrap();
    server.borrow().send_status(3.25, 41).unwrap();
    controller.update().unwrap();

    let client = client.borrow();
    assert_eq!(
        client.feedback(),
        Some(MotorFeedback {
            value: 543.21,
            limit_switches: 0b0000_0010
        })
    );
    let status = client.status().unwrap();
    assert_eq!(status.load_current, 3.25);
    assert_eq!(status.temperature, 41);
}

#[test]
fn frames_for_other_instances_are_not_delivered() {
    let (controller, actuator) = link();
    let client = MotorDriverClient::attach(&controller, 1).unwrap();
    let server = MotorDriverServer::attach(&actuator, 2).unwrap();

    client.borrow().send_target(10.0).unwrap();
    let stats = actuator.update().unwrap();

    assert_eq!(stats.dropped, 1);
    assert_eq!(server.borrow_mut().take_target(), None);
}

#[test]
fn solenoid_round_trip() {
    let (controller, actuator) = link();
    let client = SolenoidDriverClient::attach(&controller, 3).unwrap();
    let server = SolenoidDriverServer::attach(&actuator, 3).unwrap();

    client.borrow().set_target(true).unwrap();
    actuator.update().unwrap();
    let target = server.borrow_mut().take_target();
    assert_eq!(target, Some(true));

    server.borrow().send_feedback(true).unwrap();
    controller.update().unwrap();
    assert_eq!(client.borrow().feedback_value(), Some(true));

    server.borrow().send_feedback(false).unwrap();
    controller.update().unwrap();
    assert_eq!(client.borrow().feedback_value(), Some(false));
}

#[test]
fn dropped_client_stops_tracking_feedback() {
    let (controller, actuator) = link();
    let server = SolenoidDriverServer::attach(&actuator, 3).unwrap();
    let client = SolenoidDriverClient::attach(&controller, 3).unwrap();
    drop(client);

    server.borrow().send_feedback(true).unwrap();
    let stats = controller.update().unwrap();
    assert_eq!(stats.dropped, 1);
    assert!(controller.registered_keys().is_empty());
}
