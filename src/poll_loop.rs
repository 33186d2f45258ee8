//! Fixed-rate orchestrator between the input backend, the render sink and
//! the state bus.
//!
//! Each tick polls the backend once, hands the snapshot to the render
//! sink (fire-and-forget, no backpressure) and publishes it on the bus.
//! The loop owns the backend for its whole life and shuts it down exactly
//! once on exit; `run` consumes the loop to make that structural.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::backend::InputBackend;
use crate::bus::StateBus;
use crate::snapshot::Snapshot;

pub struct PollLoop {
    backend: Box<dyn InputBackend>,
    bus: Arc<StateBus>,
    shutdown: Arc<AtomicBool>,
    tick: Duration,
}

impl PollLoop {
    pub fn new(
        backend: Box<dyn InputBackend>,
        bus: Arc<StateBus>,
        shutdown: Arc<AtomicBool>,
        tick: Duration,
    ) -> Self {
        Self {
            backend,
            bus,
            shutdown,
            tick,
        }
    }

    /// Run until the shutdown flag is observed.
    pub fn run(mut self, mut render: impl FnMut(&Snapshot)) {
        info!(backend = self.backend.name(), "poll loop started");
        while !self.shutdown.load(Ordering::Relaxed) {
            let snapshot = self.backend.poll();
            render(&snapshot);
            self.bus.publish(snapshot);
            std::thread::sleep(self.tick);
        }
        self.backend.shutdown();
        info!("poll loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::scripted::ScriptedBackend;
    use crate::snapshot::Sticks;
    use crate::Result;
    use std::sync::atomic::AtomicUsize;

    const TICK: Duration = Duration::from_millis(20);

    fn connected() -> Snapshot {
        Snapshot {
            connected: true,
            sticks: Sticks {
                lx: 0.5,
                ..Default::default()
            },
            ..Snapshot::default()
        }
    }

    /// Backend that counts its lifecycle calls.
    struct ProbeBackend {
        shutdowns: Arc<AtomicUsize>,
    }

    impl InputBackend for ProbeBackend {
        fn init(&mut self) -> Result<()> {
            Ok(())
        }
        fn poll(&mut self) -> Snapshot {
            Snapshot::disconnected()
        }
        fn shutdown(&mut self) {
            self.shutdowns.fetch_add(1, Ordering::Relaxed);
        }
        fn name(&self) -> &str {
            "probe"
        }
    }

    #[test]
    fn disconnect_sequence_reaches_the_bus_in_order() {
        // Device connects, drops for three ticks, reconnects.
        let script = [
            connected(),
            Snapshot::disconnected(),
            Snapshot::disconnected(),
            Snapshot::disconnected(),
            connected(),
        ];
        let backend = ScriptedBackend::with_sequence(script);
        let bus = Arc::new(StateBus::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let poll_loop = PollLoop::new(
            Box::new(backend),
            Arc::clone(&bus),
            Arc::clone(&shutdown),
            TICK,
        );
        let producer = std::thread::spawn(move || poll_loop.run(|_| {}));

        let mut seen = 0;
        let mut flags = Vec::new();
        while flags.len() < 5 {
            let (seq, snap) = bus.wait_newer(seen).expect("bus still open");
            seen = seq;
            flags.push(snap.connected);
            if !snap.connected {
                // Disconnected frames carry neutral fields, never stale data.
                assert_eq!(*snap, Snapshot::disconnected());
            }
        }
        shutdown.store(true, Ordering::Relaxed);
        producer.join().unwrap();

        assert_eq!(flags, [true, false, false, false, true]);
    }

    #[test]
    fn backend_is_shut_down_exactly_once_and_publishing_stops() {
        let shutdowns = Arc::new(AtomicUsize::new(0));
        let backend = ProbeBackend {
            shutdowns: Arc::clone(&shutdowns),
        };
        let bus = Arc::new(StateBus::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let poll_loop = PollLoop::new(
            Box::new(backend),
            Arc::clone(&bus),
            Arc::clone(&shutdown),
            Duration::from_millis(1),
        );
        let producer = std::thread::spawn(move || poll_loop.run(|_| {}));

        // Let a few ticks through, then stop.
        std::thread::sleep(Duration::from_millis(30));
        shutdown.store(true, Ordering::Relaxed);
        producer.join().unwrap();

        assert_eq!(shutdowns.load(Ordering::Relaxed), 1);
        let seq = bus.seq();
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(bus.seq(), seq, "no publishes after the loop exits");
    }

    #[test]
    fn render_sink_sees_every_polled_snapshot() {
        let backend = ScriptedBackend::with_sequence([connected()]);
        let bus = Arc::new(StateBus::new());
        let shutdown = Arc::new(AtomicBool::new(false));
        let stop = Arc::clone(&shutdown);

        let rendered = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&rendered);
        let poll_loop = PollLoop::new(
            Box::new(backend),
            Arc::clone(&bus),
            shutdown,
            Duration::from_millis(1),
        );
        let producer = std::thread::spawn(move || {
            poll_loop.run(|_| {
                counter.fetch_add(1, Ordering::Relaxed);
            });
        });
        std::thread::sleep(Duration::from_millis(30));
        stop.store(true, Ordering::Relaxed);
        producer.join().unwrap();

        let renders = rendered.load(Ordering::Relaxed) as u64;
        assert!(renders > 0);
        assert_eq!(renders, bus.seq(), "one publish per rendered tick");
    }
}
