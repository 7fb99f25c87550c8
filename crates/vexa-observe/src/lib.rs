//! vexa-observe: vendor-neutral observability ABI.
//!
//! Index code depends only on these traits and event types. Backends
//! (Prometheus, OTLP, test capture) live elsewhere.

pub trait Counter: Send + Sync {
    fn inc(&self, v: u64);
}
pub trait Gauge: Send + Sync {
    fn set(&self, v: i64);
}
pub trait Histogram: Send + Sync {
    fn observe(&self, v: f64);
}

pub trait Meter: Send + Sync + 'static {
    fn counter(
        &self,
        name: &'static str,
        labels: &'static [(&'static str, &'static str)],
    ) -> Box<dyn Counter>;
    fn gauge(
        &self,
        name: &'static str,
        labels: &'static [(&'static str, &'static str)],
    ) -> Box<dyn Gauge>;
    fn histo(
        &self,
        name: &'static str,
        _buckets: &'static [f64],
        labels: &'static [(&'static str, &'static str)],
    ) -> Box<dyn Histogram>;
    fn emit(&self, evt: VizEvent);
}

/// A do-nothing meter for tests and users who don't care about telemetry.
#[derive(Clone, Default)]
pub struct NoopMeter;
struct NoopC;
impl Counter for NoopC {
    fn inc(&self, _v: u64) {}
}
struct NoopG;
impl Gauge for NoopG {
    fn set(&self, _v: i64) {}
}
struct NoopH;
impl Histogram for NoopH {
    fn observe(&self, _v: f64) {}
}
impl Meter for NoopMeter {
    fn counter(
        &self,
        _n: &'static str,
        _l: &'static [(&'static str, &'static str)],
    ) -> Box<dyn Counter> {
        Box::new(NoopC)
    }
    fn gauge(
        &self,
        _n: &'static str,
        _l: &'static [(&'static str, &'static str)],
    ) -> Box<dyn Gauge> {
        Box::new(NoopG)
    }
    fn histo(
        &self,
        _n: &'static str,
        _b: &'static [f64],
        _l: &'static [(&'static str, &'static str)],
    ) -> Box<dyn Histogram> {
        Box::new(NoopH)
    }
    fn emit(&self, _e: VizEvent) {}
}

/// Typed events for live visualization (vectors are never included).
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub enum VizEvent {
    Index(IndexEvt),
}

#[derive(Clone, Debug, PartialEq)]
pub struct IndexEvt {
    /// Process-unique index id
    pub index: u64,
    pub kind: IndexKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum IndexKind {
    Created {
        dimension: usize,
        capacity: usize,
        metric: &'static str,
    },
    Inserted {
        len: usize,
    },
    /// An existing label was re-inserted with new coordinates
    Overwritten {
        label: u64,
    },
    CapacityExceeded {
        capacity: usize,
    },
    Searched {
        k: usize,
        found: usize,
    },
    SearchWidthChanged {
        from: usize,
        to: usize,
    },
    Destroyed {
        len: usize,
    },
}

/// Macros (simple versions). Can be feature-gated if desired.
#[macro_export]
macro_rules! obs_count {
    ($m:expr, $name:expr, $labels:expr, $v:expr) => {{
        $m.counter($name, $labels).inc($v as u64);
    }};
}
#[macro_export]
macro_rules! obs_gauge {
    ($m:expr, $name:expr, $labels:expr, $v:expr) => {{
        $m.gauge($name, $labels).set($v as i64);
    }};
}
#[macro_export]
macro_rules! obs_hist {
    ($m:expr, $name:expr, $labels:expr, $v:expr) => {{
        $m.histo($name, &[], $labels).observe($v as f64);
    }};
}
#[macro_export]
macro_rules! obs_timed {
    ($m:expr, $name:expr, $labels:expr, $body:block) => {{
        let __t = std::time::Instant::now();
        let __ret = { $body };
        let __ms = __t.elapsed().as_secs_f64() * 1000.0;
        $m.histo($name, &[], $labels).observe(__ms);
        __ret
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    struct SharedCounter(Arc<AtomicU64>);
    impl Counter for SharedCounter {
        fn inc(&self, v: u64) {
            self.0.fetch_add(v, Ordering::Relaxed);
        }
    }

    struct CountingMeter {
        total: Arc<AtomicU64>,
    }

    impl Meter for CountingMeter {
        fn counter(
            &self,
            _n: &'static str,
            _l: &'static [(&'static str, &'static str)],
        ) -> Box<dyn Counter> {
            Box::new(SharedCounter(self.total.clone()))
        }
        fn gauge(
            &self,
            n: &'static str,
            l: &'static [(&'static str, &'static str)],
        ) -> Box<dyn Gauge> {
            NoopMeter.gauge(n, l)
        }
        fn histo(
            &self,
            n: &'static str,
            b: &'static [f64],
            l: &'static [(&'static str, &'static str)],
        ) -> Box<dyn Histogram> {
            NoopMeter.histo(n, b, l)
        }
        fn emit(&self, _e: VizEvent) {}
    }

    #[test]
    fn test_macros_drive_meter() {
        let meter = CountingMeter {
            total: Arc::new(AtomicU64::new(0)),
        };

        obs_count!(meter, "vexa_test_total", &[], 2);
        obs_count!(meter, "vexa_test_total", &[], 3);
        assert_eq!(meter.total.load(Ordering::Relaxed), 5);

        let out = obs_timed!(meter, "vexa_test_ms", &[], { 40 + 2 });
        assert_eq!(out, 42);

        obs_gauge!(NoopMeter, "vexa_test_gauge", &[], 7);
        obs_hist!(NoopMeter, "vexa_test_hist", &[], 1.5);
    }
}
