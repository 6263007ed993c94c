use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Coalesced redraw-pending flag shared between the timer thread, the
/// input gate and the scheduler. At most one redraw is ever queued: a
/// second arm before the first consume is a no-op.
#[derive(Debug, Clone, Default)]
pub struct RedrawGate(Arc<AtomicBool>);

impl RedrawGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a redraw due. Returns true if the caller should enqueue a
    /// notification, false if one is already pending.
    pub fn arm(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    /// Take the pending redraw, if any.
    pub fn consume(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

/// Periodic refresh timer. Runs on its own thread and only ever arms
/// the gate and fires the notifier; pixel buffers are never touched
/// here. Deadlines are absolute so sleep jitter does not accumulate.
pub struct RefreshDriver {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

/// Longest single wait slice, so stopping the driver never blocks for
/// a full refresh interval of a slow stimulus.
const MAX_WAIT_SLICE: Duration = Duration::from_millis(25);

impl RefreshDriver {
    pub fn spawn<F>(interval: Duration, gate: RedrawGate, notify: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);
        let handle = std::thread::Builder::new()
            .name("refresh-timer".into())
            .spawn(move || {
                let mut deadline = Instant::now() + interval;
                while thread_running.load(Ordering::Relaxed) {
                    let now = Instant::now();
                    if now < deadline {
                        precise_sleep((deadline - now).min(MAX_WAIT_SLICE));
                        continue;
                    }
                    if gate.arm() {
                        notify();
                    }
                    deadline += interval;
                    // If rendering stalled past several periods, resync
                    // instead of firing a burst; the skips show up only
                    // in the interval statistics.
                    let now = Instant::now();
                    while deadline <= now {
                        deadline += interval;
                    }
                }
            })
            .expect("spawn refresh timer thread");
        Self { running, handle: Some(handle) }
    }

    /// Stop the timer thread and wait for it to exit.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RefreshDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Sleep with better-than-scheduler-quantum precision where the
/// platform allows it.
pub fn precise_sleep(duration: Duration) {
    #[cfg(target_os = "linux")]
    linux_sleep(duration);
    #[cfg(target_os = "windows")]
    windows_sleep(duration);
    #[cfg(target_os = "macos")]
    macos_sleep(duration);
    #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
    std::thread::sleep(duration);
}

#[cfg(target_os = "linux")]
fn linux_sleep(duration: Duration) {
    use libc::{clock_nanosleep, timespec, CLOCK_MONOTONIC};

    let req = timespec {
        tv_sec: duration.as_secs() as libc::time_t,
        tv_nsec: duration.subsec_nanos() as libc::c_long,
    };

    unsafe {
        clock_nanosleep(CLOCK_MONOTONIC, 0, &req, std::ptr::null_mut());
    }
}

#[cfg(target_os = "windows")]
fn windows_sleep(duration: Duration) {
    use windows::Win32::Foundation::CloseHandle;
    use windows::Win32::System::Threading::{
        CreateWaitableTimerW, SetWaitableTimer, WaitForSingleObject,
    };

    unsafe {
        if let Ok(timer) = CreateWaitableTimerW(None, true, None) {
            // Negative due time = relative, in 100 ns units.
            let due = -(duration.as_nanos() as i64 / 100);
            if SetWaitableTimer(timer, &due, 0, None, None, false).is_ok() {
                WaitForSingleObject(timer, u32::MAX);
            }
            let _ = CloseHandle(timer);
        } else {
            std::thread::sleep(duration);
        }
    }
}

#[cfg(target_os = "macos")]
fn macos_sleep(duration: Duration) {
    use mach2::mach_time::{mach_absolute_time, mach_timebase_info, mach_timebase_info_data_t};

    if duration.as_nanos() < 100_000 {
        unsafe {
            let start = mach_absolute_time();
            let mut timebase = mach_timebase_info_data_t { numer: 0, denom: 0 };
            mach_timebase_info(&mut timebase);

            let target_ticks =
                duration.as_nanos() as u64 * timebase.denom as u64 / timebase.numer as u64;

            while mach_absolute_time() - start < target_ticks {
                std::hint::spin_loop();
            }
        }
    } else {
        std::thread::sleep(duration);
    }
}
