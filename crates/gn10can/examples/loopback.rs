//! Controller and actuator exchanging motor and solenoid messages over a
//! memory link.
//!
//! Run with:
//!   RUST_LOG=trace cargo run --example loopback

use gn10can::bus::CanBus;
use gn10can::devices::{
    GainKind, MotorConfig, MotorDriverClient, MotorDriverServer, MotorSettings,
    SolenoidDriverClient, SolenoidDriverServer,
};
use gn10can::transport::MemoryDriver;
use tracing::info;
use tracing_subscriber::EnvFilter;

const MOTOR_SETTINGS: &str = r#"{
    "max_duty_ratio": 0.8,
    "accel_ratio": 0.25,
    "telemetry_cycle_ms": 10,
    "encoder": "incremental_speed"
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let (controller_link, actuator_link) = MemoryDriver::pair();
    let controller = CanBus::new(controller_link);
    let actuator = CanBus::new(actuator_link);

    let motor = MotorDriverClient::attach(&controller, 1)?;
    let motor_fw = MotorDriverServer::attach(&actuator, 1)?;
    let valve = SolenoidDriverClient::attach(&controller, 0)?;
    let valve_fw = SolenoidDriverServer::attach(&actuator, 0)?;

    let settings: MotorSettings = serde_json::from_str(MOTOR_SETTINGS)?;
    {
        let motor = motor.borrow();
        motor.send_init(&MotorConfig::from(settings))?;
        motor.send_gain(GainKind::Kp, 0.8)?;
        motor.send_target(123.45)?;
    }
    valve.borrow().set_target(true)?;

    let stats = actuator.update()?;
    info!(?stats, "actuator pass");

    {
        let mut fw = motor_fw.borrow_mut();
        if let Some(config) = fw.take_init() {
            info!(?config, "motor configured");
        }
        if let Some(target) = fw.take_target() {
            fw.send_feedback(target * 0.5, 0)?;
            fw.send_status(1.2, 35)?;
        }
    }
    {
        let mut fw = valve_fw.borrow_mut();
        if let Some(on) = fw.take_target() {
            fw.send_feedback(on)?;
        }
    }

    let stats = controller.update()?;
    info!(?stats, "controller pass");

    println!("motor feedback: {:?}", motor.borrow().feedback());
    println!("motor status:   {:?}", motor.borrow().status());
    println!("valve state:    {:?}", valve.borrow().feedback_value());
    Ok(())
}
