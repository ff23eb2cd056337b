//! Per-frame task registry.
//!
//! Tasks register once and are ticked every frame until they report
//! [`TaskStatus::Done`], at which point the loop drops them. This is how
//! transient effects schedule themselves without the caller tracking them.

use crate::compositor::Compositor;

/// Whether a task wants another frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Continue,
    Done,
}

/// Handle to a registered task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

/// Something driven once per frame
pub trait FrameTask {
    /// Advance one frame
    fn tick(&mut self, dt: f32, surfaces: &mut Compositor) -> TaskStatus;

    /// Release resources when cancelled before finishing on its own
    fn teardown(&mut self, _surfaces: &mut Compositor) {}
}

/// Ordered set of live frame tasks
#[derive(Default)]
pub struct FrameLoop {
    tasks: Vec<(TaskId, Box<dyn FrameTask>)>,
    next_id: u64,
    frame: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` starting with the next tick
    pub fn register(&mut self, task: Box<dyn FrameTask>) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push((id, task));
        id
    }

    /// Tick every task once, dropping those that finish. Returns how many finished.
    pub fn tick(&mut self, dt: f32, surfaces: &mut Compositor) -> usize {
        self.frame += 1;
        let before = self.tasks.len();
        self.tasks
            .retain_mut(|(_, task)| task.tick(dt, surfaces) == TaskStatus::Continue);
        before - self.tasks.len()
    }

    /// Remove a task early, letting it tear down. Returns `false` if unknown.
    pub fn cancel(&mut self, id: TaskId, surfaces: &mut Compositor) -> bool {
        let Some(index) = self.tasks.iter().position(|(task_id, _)| *task_id == id) else {
            return false;
        };
        let (_, mut task) = self.tasks.remove(index);
        task.teardown(surfaces);
        true
    }

    /// Cancel everything (shutdown)
    pub fn clear(&mut self, surfaces: &mut Compositor) {
        for (_, mut task) in self.tasks.drain(..) {
            task.teardown(surfaces);
        }
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|(task_id, _)| *task_id == id)
    }

    /// Number of live tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Frames ticked so far
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Countdown {
        remaining: u32,
        torn_down: Rc<Cell<bool>>,
    }

    impl FrameTask for Countdown {
        fn tick(&mut self, _dt: f32, _surfaces: &mut Compositor) -> TaskStatus {
            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining == 0 {
                TaskStatus::Done
            } else {
                TaskStatus::Continue
            }
        }

        fn teardown(&mut self, _surfaces: &mut Compositor) {
            self.torn_down.set(true);
        }
    }

    fn countdown(remaining: u32) -> (Box<Countdown>, Rc<Cell<bool>>) {
        let flag = Rc::new(Cell::new(false));
        let task = Box::new(Countdown {
            remaining,
            torn_down: Rc::clone(&flag),
        });
        (task, flag)
    }

    #[test]
    fn test_tasks_deregister_when_done() {
        let mut surfaces = Compositor::new();
        let mut frames = FrameLoop::new();
        let (short, _) = countdown(1);
        let (long, _) = countdown(3);
        frames.register(short);
        let long_id = frames.register(long);

        assert_eq!(frames.tick(0.016, &mut surfaces), 1);
        assert!(frames.contains(long_id));
        assert_eq!(frames.tick(0.016, &mut surfaces), 0);
        assert_eq!(frames.tick(0.016, &mut surfaces), 1);
        assert!(frames.is_empty());
        assert_eq!(frames.frame(), 3);
    }

    #[test]
    fn test_cancel_tears_down_once() {
        let mut surfaces = Compositor::new();
        let mut frames = FrameLoop::new();
        let (task, flag) = countdown(10);
        let id = frames.register(task);

        assert!(frames.cancel(id, &mut surfaces));
        assert!(flag.get());
        assert!(!frames.cancel(id, &mut surfaces));
    }
}
