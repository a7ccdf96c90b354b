use super::ProgressEvent;
use crate::LoadError;
use parking_lot::Mutex;
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll, Waker},
};

#[derive(Debug)]
struct LoadSlot<T> {
    result: Option<Result<T, LoadError>>,
    progress: ProgressEvent,
    is_abandoned: bool,
    waker: Option<Waker>,
}

/// Consumer half of an asynchronous load. Can be polled each tick or awaited.
///
/// Dropping the task abandons the load; its completer discards the value.
#[derive(Debug)]
pub struct LoadTask<T> {
    slot: Arc<Mutex<LoadSlot<T>>>,
}

/// Producer half of an asynchronous load.
#[derive(Debug)]
pub struct LoadCompleter<T> {
    slot: Arc<Mutex<LoadSlot<T>>>,
}

pub fn load_task<T>() -> (LoadTask<T>, LoadCompleter<T>) {
    let slot = Arc::new(Mutex::new(LoadSlot {
        result: None,
        progress: ProgressEvent::default(),
        is_abandoned: false,
        waker: None,
    }));

    (
        LoadTask { slot: slot.clone() },
        LoadCompleter { slot },
    )
}

impl<T> LoadTask<T> {
    /// A task that is already complete.
    pub fn ready(result: Result<T, LoadError>) -> Self {
        let (task, completer) = load_task();
        completer.complete(result);
        task
    }

    pub fn is_ready(&self) -> bool {
        self.slot.lock().result.is_some()
    }

    pub fn progress(&self) -> ProgressEvent {
        self.slot.lock().progress
    }

    /// Takes the result if the load has completed.
    pub fn try_take(&mut self) -> Option<Result<T, LoadError>> {
        self.slot.lock().result.take()
    }

    /// Blocks the current thread until the load completes.
    pub fn wait(self) -> Result<T, LoadError> {
        pollster::block_on(self)
    }
}

impl<T> Future for LoadTask<T> {
    type Output = Result<T, LoadError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.slot.lock();

        match slot.result.take() {
            Some(result) => Poll::Ready(result),
            None => {
                slot.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

impl<T> Drop for LoadTask<T> {
    fn drop(&mut self) {
        let mut slot = self.slot.lock();
        slot.is_abandoned = true;
        slot.result = None;
    }
}

impl<T> LoadCompleter<T> {
    pub fn report_progress(&self, loaded: u64, total: Option<u64>) {
        self.slot.lock().progress = ProgressEvent::new(loaded, total);
    }

    pub fn is_abandoned(&self) -> bool {
        self.slot.lock().is_abandoned
    }

    /// Returns `false` and drops the result if the task was abandoned.
    pub fn complete(self, result: Result<T, LoadError>) -> bool {
        let waker = {
            let mut slot = self.slot.lock();

            if slot.is_abandoned {
                return false;
            }

            slot.result = Some(result);
            slot.waker.take()
        };

        if let Some(waker) = waker {
            waker.wake();
        }

        true
    }
}

/// An in-flight load of a named asset, tracking the last progress seen by its owner.
#[derive(Debug)]
pub(crate) struct PendingLoad<T> {
    pub name: String,
    pub task: LoadTask<T>,
    last_progress: Option<ProgressEvent>,
}

impl<T> PendingLoad<T> {
    pub fn new(name: impl Into<String>, task: LoadTask<T>) -> Self {
        Self {
            name: name.into(),
            task,
            last_progress: None,
        }
    }

    /// Returns the progress if it changed since the last call.
    pub fn poll_progress(&mut self) -> Option<ProgressEvent> {
        let progress = self.task.progress();

        if self.last_progress == Some(progress) {
            return None;
        }

        self.last_progress = Some(progress);
        Some(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_load_task_poll() {
        let (mut task, completer) = load_task::<u32>();
        assert!(!task.is_ready());
        assert!(task.try_take().is_none());

        completer.report_progress(3, Some(4));
        assert_eq!(task.progress(), ProgressEvent::new(3, Some(4)));

        assert!(completer.complete(Ok(7)));
        assert!(task.is_ready());
        assert_eq!(task.try_take(), Some(Ok(7)));
        assert!(task.try_take().is_none());
    }

    #[test]
    fn test_load_task_abandoned_completion_is_noop() {
        let (task, completer) = load_task::<u32>();
        drop(task);

        assert!(completer.is_abandoned());
        assert!(!completer.complete(Ok(1)));
    }

    #[test]
    fn test_load_task_wait() {
        let (task, completer) = load_task::<String>();

        let handle = thread::spawn(move || {
            completer.complete(Ok("done".to_owned()));
        });

        assert_eq!(task.wait(), Ok("done".to_owned()));
        handle.join().unwrap();
    }

    #[test]
    fn test_pending_load_reports_changes_once() {
        let (task, completer) = load_task::<u32>();
        let mut pending = PendingLoad::new("motion", task);

        assert_eq!(pending.poll_progress(), Some(ProgressEvent::default()));
        assert_eq!(pending.poll_progress(), None);

        completer.report_progress(1, None);
        assert_eq!(pending.poll_progress(), Some(ProgressEvent::new(1, None)));
    }
}
