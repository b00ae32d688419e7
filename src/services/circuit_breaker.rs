use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Состояния Circuit Breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Запросы проходят, считаем ошибки.
    Closed,
    /// Upstream считается недоступным, запросы блокируются.
    Open,
    /// Таймаут истёк, пропускаем ровно один пробный запрос.
    HalfOpen,
}

struct Inner {
    state: CircuitState,
    opened_at: Option<Instant>,
    // пробный запрос уже ушёл, остальные ждут его результата
    trial_in_flight: bool,
}

/// Circuit breaker guarding calls to an external API.
pub struct CircuitBreaker {
    inner: Mutex<Inner>,
    failure_count: AtomicU32,
    failure_threshold: u32,
    open_timeout: Duration,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, timeout_seconds: u64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                opened_at: None,
                trial_in_flight: false,
            }),
            failure_count: AtomicU32::new(0),
            failure_threshold: failure_threshold.max(1),
            open_timeout: Duration::from_secs(timeout_seconds),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // отравленный мьютекс не ломает брейкер, состояние остаётся валидным
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Можно ли сейчас выполнить запрос.
    pub fn can_execute(&self) -> bool {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => {
                if inner.trial_in_flight {
                    return false;
                }
                inner.trial_in_flight = true;
                true
            }
            CircuitState::Open => {
                let expired = inner
                    .opened_at
                    .map_or(true, |at| at.elapsed() >= self.open_timeout);
                if expired {
                    inner.state = CircuitState::HalfOpen;
                    inner.trial_in_flight = true;
                    info!("Circuit breaker transitioning to HalfOpen state");
                }
                expired
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.lock();
        if inner.state == CircuitState::HalfOpen {
            info!("Circuit breaker recovered - transitioning to Closed state");
        }
        inner.state = CircuitState::Closed;
        inner.opened_at = None;
        inner.trial_in_flight = false;
        self.failure_count.store(0, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        let failures = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        let mut inner = self.lock();
        inner.trial_in_flight = false;
        match inner.state {
            CircuitState::Closed if failures >= self.failure_threshold => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                error!(
                    "Circuit breaker OPENED - {} failures reached threshold {}",
                    failures, self.failure_threshold
                );
            }
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                warn!("Circuit breaker test failed - returning to Open state");
            }
            _ => {}
        }
    }

    /// Отпускает пробный слот, не меняя состояние (ответ не говорит о здоровье upstream).
    pub fn release_trial(&self) {
        self.lock().trial_in_flight = false;
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }
}
