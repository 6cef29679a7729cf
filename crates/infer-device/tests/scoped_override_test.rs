//! End-to-end device override scenarios against the simulated registry.

use infer_device::{
    device_for_this_scope, get_current, scoped_override, set_default, AssumedCurrentNoOp,
    DeviceConfig, DeviceContext, Error, FullOverride, RegistryCall, RestoreFailurePolicy,
    Result, ScopedDeviceOverride, SimulatedRegistry, StatusCode,
};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "infer_device=debug".into()),
        )
        .with_test_writer()
        .with_target(false)
        .try_init();
}

/// Error type of a caller one layer up, to check `?` conversion from `Error`.
#[derive(Debug, thiserror::Error)]
enum JobError {
    #[error(transparent)]
    Device(#[from] Error),
    #[error("job failed: {0}")]
    Failed(String),
}

fn run_job(
    ctx: &DeviceContext<SimulatedRegistry>,
    device: i32,
    fail: bool,
) -> std::result::Result<i32, JobError> {
    device_for_this_scope!(ctx, device);
    let seen = ctx.get_current()?;
    if fail {
        return Err(JobError::Failed(format!("on device {}", seen)));
    }
    Ok(seen)
}

#[test]
fn test_default_then_override_with_error_inside() {
    init_logging();
    let ctx = DeviceContext::with_defaults(SimulatedRegistry::new(4));

    set_default(&ctx).unwrap();
    assert_eq!(get_current(&ctx).unwrap(), 0);

    let result = run_job(&ctx, 3, true);
    match result {
        Err(JobError::Failed(msg)) => assert_eq!(msg, "on device 3"),
        other => panic!("Expected JobError::Failed, got: {:?}", other),
    }

    assert_eq!(get_current(&ctx).unwrap(), 0);
}

#[test]
fn test_job_success_restores() {
    init_logging();
    let ctx = DeviceContext::with_defaults(SimulatedRegistry::with_current(4, 2));

    assert_eq!(run_job(&ctx, 1, false).unwrap(), 1);
    assert_eq!(ctx.registry().current(), 2);
}

#[test]
fn test_job_on_invalid_device_makes_no_restore_call() {
    init_logging();
    let ctx = DeviceContext::with_defaults(SimulatedRegistry::with_current(2, 1));

    let err = run_job(&ctx, 5, false).unwrap_err();
    match err {
        JobError::Device(Error::DeviceSet { status, attempted, .. }) => {
            assert_eq!(status, StatusCode::INVALID_DEVICE);
            assert_eq!(attempted, 5);
        }
        other => panic!("Expected DeviceSet, got: {:?}", other),
    }
    assert_eq!(
        ctx.registry().calls(),
        vec![RegistryCall::Get, RegistryCall::Set(5)]
    );
}

#[test]
fn test_three_level_nesting() {
    init_logging();
    let registry = SimulatedRegistry::with_current(4, 0);

    fn level(registry: &SimulatedRegistry, devices: &[i32], trace: &mut Vec<i32>) -> Result<()> {
        let Some((&device, rest)) = devices.split_first() else {
            return Ok(());
        };
        let _scope = ScopedDeviceOverride::push(registry, device)?;
        trace.push(registry.current());
        level(registry, rest, trace)?;
        trace.push(registry.current());
        Ok(())
    }

    let mut trace = Vec::new();
    level(&registry, &[1, 2, 3], &mut trace).unwrap();

    assert_eq!(trace, vec![1, 2, 3, 3, 2, 1]);
    assert_eq!(registry.current(), 0);
}

#[test]
fn test_mixed_kinds_in_one_stack() {
    init_logging();
    let registry = SimulatedRegistry::with_current(4, 0);
    {
        let _outer = scoped_override::<FullOverride, _>(&registry, 2).unwrap();
        // Device 2 is known to be current here.
        let _inner = scoped_override::<AssumedCurrentNoOp, _>(&registry, 2).unwrap();
        assert_eq!(registry.current(), 2);
    }
    assert_eq!(registry.current(), 0);
    assert_eq!(registry.set_calls(), vec![2, 0]);
}

#[test]
fn test_configured_context_from_json() {
    init_logging();
    let config =
        DeviceConfig::from_json_str(r#"{"default_device_id": 1, "restore_failure": "log"}"#)
            .unwrap();
    assert_eq!(config.restore_failure, RestoreFailurePolicy::Log);

    let ctx = DeviceContext::new(SimulatedRegistry::with_current(4, 3), config);
    ctx.set_default().unwrap();
    assert_eq!(ctx.get_current().unwrap(), 1);

    {
        let _scope = ctx.scoped_override(2).unwrap();
        ctx.registry().fail_set_to(1, StatusCode(999));
    }
    // Logged and swallowed.
    assert_eq!(ctx.get_current().unwrap(), 2);
}
