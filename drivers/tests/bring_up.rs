mod common;

use common::{remote_device, Mock, LOCAL_ADDRESS, PHYSICAL_ADDRESS};
use gmsl_drivers::bring_up;
use gmsl_drivers::configuration::LockPolling;
use gmsl_drivers::devices::{max96716, max96724};
use gmsl_drivers::error::Error;
use gmsl_drivers::i2c;
use gmsl_drivers::registers;
use gmsl_drivers::types::Link;

#[test]
fn isolation_is_restored_after_failure() {
    let mut mock = Mock::max96716();
    mock.set_local(0x0001, 0x01);
    mock.set_local(0x0003, 0x06);
    let result = bring_up::with_isolation::<max96716::Chip, _, (), _>(
        &mut mock,
        LOCAL_ADDRESS,
        Link::A,
        |_| Err(Error::NoRemoteDevices),
    );
    assert_eq!(result, Err(Error::NoRemoteDevices));
    assert_eq!(
        mock.local_writes(),
        vec![(0x0003, 0x02), (0x0001, 0x11), (0x0001, 0x01), (0x0003, 0x06)]
    );
}

#[test]
fn isolation_snapshot_failure_leaves_channels_alone() {
    let mut mock = Mock::max96724();
    mock.fail_read(LOCAL_ADDRESS, 0x0003);
    let mut called = false;
    let result = bring_up::with_isolation::<max96724::Chip, _, _, _>(
        &mut mock,
        LOCAL_ADDRESS,
        Link::C,
        |_| {
            called = true;
            Ok(())
        },
    );
    assert!(matches!(result, Err(Error::I2c(_))));
    assert!(!called);
    assert!(mock.local_writes().is_empty());
}

#[test]
fn restore_failure_is_reported() {
    let mut mock = Mock::max96716();
    let handle = mock.clone();
    let result = bring_up::with_isolation::<max96716::Chip, _, _, _>(
        &mut mock,
        LOCAL_ADDRESS,
        Link::B,
        |_| {
            handle.fail_write(LOCAL_ADDRESS, 0x0001);
            Ok(7)
        },
    );
    assert_eq!(
        result,
        Err(Error::I2c(i2c::Error::Nack {
            address: LOCAL_ADDRESS,
            register: 0x0001
        }))
    );
    // the other register is still written back
    assert_eq!(mock.local_writes().last(), Some(&(0x0003, 0x00)));
}

#[test]
fn max96724_isolation_opens_one_channel() {
    let mut mock = Mock::max96724();
    mock.set_local(0x0003, 0xFF);
    let seen = bring_up::with_isolation::<max96724::Chip, _, _, _>(
        &mut mock,
        LOCAL_ADDRESS,
        Link::D,
        |transport| Ok(registers::read(transport, LOCAL_ADDRESS, 0x0003)?),
    )
    .unwrap();
    assert_eq!(seen, 0xBF);
    assert_eq!(mock.local(0x0003), 0xFF);
}

#[test]
fn bring_up_moves_serializer_to_alias() {
    let mut mock = Mock::max96716();
    mock.connect(Link::A, 0x0013, 0x91);
    mock.connect(Link::B, 0x5009, 0x91);
    bring_up::bring_up::<max96716::Chip, _>(
        &mut mock,
        LOCAL_ADDRESS,
        &remote_device(Link::B, 0x42),
        &LockPolling::default(),
    )
    .unwrap();
    assert_eq!(mock.remote_address(Link::A), Some(PHYSICAL_ADDRESS));
    assert_eq!(mock.remote_address(Link::B), Some(0x42));
    assert_eq!(mock.remote_register(Link::B, 0x0000), Some(0x84));
    assert_eq!(mock.remote_register(Link::B, 0x0318), Some(0x5E));
    assert_eq!(mock.remote_register(Link::B, 0x0010), Some(0x31));
    assert_eq!(mock.remote_register(Link::A, 0x0318), None);
    assert_eq!(mock.local(0x0001), 0x00);
    assert_eq!(mock.local(0x0003), 0x00);
}

#[test]
fn bring_up_is_idempotent() {
    let mut mock = Mock::max96716();
    mock.connect(Link::A, 0x0013, 0x91);
    let remote_device = remote_device(Link::A, 0x41);
    for _ in 0..2 {
        bring_up::bring_up::<max96716::Chip, _>(
            &mut mock,
            LOCAL_ADDRESS,
            &remote_device,
            &LockPolling::default(),
        )
        .unwrap();
        assert_eq!(mock.remote_address(Link::A), Some(0x41));
        assert_eq!(mock.remote_register(Link::A, 0x0000), Some(0x82));
    }
}

#[test]
fn bring_up_requires_lock() {
    let mut mock = Mock::max96724();
    let result = bring_up::bring_up::<max96724::Chip, _>(
        &mut mock,
        LOCAL_ADDRESS,
        &remote_device(Link::B, 0x42),
        &LockPolling::default(),
    );
    assert_eq!(result, Err(Error::LinkNotLocked(Link::B)));
    assert!(mock.local_writes().is_empty());
}

#[test]
fn custom_remote_initialization() {
    let mut mock = Mock::max96724();
    mock.connect(Link::C, 0x000B, 0xC8);
    let mut remote_device = remote_device(Link::C, 0x43);
    remote_device.serializer = gmsl_drivers::configuration::Serializer::Max96717F;
    remote_device.initialization = Some(vec![registers::Register::new(0x0302, 0x10)]);
    bring_up::bring_up::<max96724::Chip, _>(
        &mut mock,
        LOCAL_ADDRESS,
        &remote_device,
        &LockPolling::default(),
    )
    .unwrap();
    assert_eq!(mock.remote_register(Link::C, 0x0302), Some(0x10));
    assert_eq!(mock.remote_register(Link::C, 0x02DF), None);
}
