//! Panic routing. Kept in its own test binary because the panic hook is
//! process-wide.

mod common;

use std::time::Duration;

use service_orchestrator::lifecycle::ChannelSignals;
use service_orchestrator::{BoxError, Orchestrator, ShutdownReason};

use common::{test_config, RecordingExit};

#[tokio::test]
async fn test_panic_in_background_task_shuts_down_with_failure() {
    let exit = RecordingExit::default();
    let (_signals_tx, signals) = ChannelSignals::channel();
    let mut config = test_config();
    config.shutdown.trap_panics = true;

    let orchestrator = Orchestrator::new(config)
        .with_signals(signals)
        .with_exit(exit.clone())
        .custom(|| async {
            tokio::spawn(async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                panic!("worker lost its queue");
            });
            Ok::<(), BoxError>(())
        })
        .unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(5), orchestrator.run(None))
        .await
        .unwrap()
        .unwrap();

    match &outcome.reason {
        ShutdownReason::Panic(message) => assert!(message.contains("worker lost its queue"), "{}", message),
        other => panic!("unexpected reason {:?}", other),
    }
    assert_eq!(outcome.exit_code, 1);
    assert_eq!(exit.codes(), vec![1]);
}
