/*!
 * Ready Queue
 * Priority-ordered multiset of READY processes with aging support
 */

use crate::core::types::{Pid, TimeMs};
use crate::process::PcbHandle;
use parking_lot::Mutex;

/// Ready queue ordered by effective priority ascending, FIFO within a
/// priority class
///
/// The backing vec is kept sorted: position 0 is always the next process
/// to dispatch. Aging re-keys members in place and restores ordering with
/// a stable sort, so two processes re-keyed to the same class keep their
/// prior relative order.
pub struct ReadyQueue {
    inner: Mutex<Vec<PcbHandle>>,
}

impl ReadyQueue {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
        }
    }

    /// Insert at the tail of the process's priority class
    pub fn enqueue(&self, handle: PcbHandle) {
        let priority = handle.read().effective_priority;
        let mut queue = self.inner.lock();
        let pos = queue
            .iter()
            .position(|h| h.read().effective_priority > priority)
            .unwrap_or(queue.len());
        queue.insert(pos, handle);
    }

    /// Remove and return the head (best priority, earliest inserted)
    pub fn dequeue(&self) -> Option<PcbHandle> {
        let mut queue = self.inner.lock();
        if queue.is_empty() {
            None
        } else {
            Some(queue.remove(0))
        }
    }

    /// Targeted removal; idempotent when the pid is absent
    pub fn remove(&self, pid: Pid) -> bool {
        let mut queue = self.inner.lock();
        if let Some(pos) = queue.iter().position(|h| h.read().pid == pid) {
            queue.remove(pos);
            true
        } else {
            false
        }
    }

    /// Re-key every member from its accumulated waiting span, then
    /// restore global ordering
    pub fn apply_aging(&self, aging_factor_sec: u64, now_ms: TimeMs) {
        let mut queue = self.inner.lock();
        for handle in queue.iter() {
            let mut pcb = handle.write();
            let waited_sec = now_ms.saturating_sub(pcb.last_ready_ms) / 1000;
            pcb.recompute_effective_priority(aging_factor_sec, waited_sec);
        }
        queue.sort_by_cached_key(|h| h.read().effective_priority);
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.inner.lock().iter().any(|h| h.read().pid == pid)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Pids in dispatch order, for inspection
    pub fn pids(&self) -> Vec<Pid> {
        self.inner.lock().iter().map(|h| h.read().pid).collect()
    }
}

impl Default for ReadyQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{Pcb, ProcessState};

    fn ready(pid: Pid, priority: u8, last_ready_ms: TimeMs) -> PcbHandle {
        let handle = Pcb::handle(pid, &format!("p{}", pid), priority, 1000, last_ready_ms);
        handle.write().state = ProcessState::Ready;
        handle
    }

    #[test]
    fn test_dispatch_order_by_priority() {
        let queue = ReadyQueue::new();
        queue.enqueue(ready(1, 8, 0));
        queue.enqueue(ready(2, 2, 0));
        queue.enqueue(ready(3, 5, 0));

        assert_eq!(queue.pids(), vec![2, 3, 1]);
        assert_eq!(queue.dequeue().unwrap().read().pid, 2);
        assert_eq!(queue.dequeue().unwrap().read().pid, 3);
        assert_eq!(queue.dequeue().unwrap().read().pid, 1);
        assert!(queue.dequeue().is_none());
    }

    #[test]
    fn test_fifo_within_priority_class() {
        let queue = ReadyQueue::new();
        queue.enqueue(ready(1, 5, 0));
        queue.enqueue(ready(2, 5, 0));
        queue.enqueue(ready(3, 5, 0));

        assert_eq!(queue.pids(), vec![1, 2, 3]);
    }

    #[test]
    fn test_enqueue_after_equal_priority() {
        let queue = ReadyQueue::new();
        queue.enqueue(ready(1, 3, 0));
        queue.enqueue(ready(2, 7, 0));
        queue.enqueue(ready(3, 3, 0));

        // pid 3 lands at the tail of the 3-class, ahead of the 7-class
        assert_eq!(queue.pids(), vec![1, 3, 2]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let queue = ReadyQueue::new();
        queue.enqueue(ready(1, 5, 0));
        queue.enqueue(ready(2, 5, 0));

        assert!(queue.contains(1));
        assert!(queue.remove(1));
        assert!(!queue.contains(1));
        assert!(!queue.remove(1));
        assert!(!queue.remove(99));
        assert!(queue.contains(2));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_aging_promotes_long_waiters() {
        let queue = ReadyQueue::new();
        queue.enqueue(ready(1, 2, 10_000)); // just arrived
        queue.enqueue(ready(2, 9, 0)); // waiting since epoch

        // 10 s waited / factor 1 s lifts pid 2 to class 0
        queue.apply_aging(1, 10_000);

        assert_eq!(queue.pids(), vec![2, 1]);
        assert_eq!(queue.dequeue().unwrap().read().effective_priority, 0);
    }

    #[test]
    fn test_aging_is_stable_for_equal_keys() {
        let queue = ReadyQueue::new();
        queue.enqueue(ready(1, 6, 0));
        queue.enqueue(ready(2, 6, 0));
        queue.enqueue(ready(3, 6, 0));

        // All three re-key to the same class; insertion order survives
        queue.apply_aging(1, 4_000);
        assert_eq!(queue.pids(), vec![1, 2, 3]);
        assert_eq!(queue.dequeue().unwrap().read().effective_priority, 2);
    }

    #[test]
    fn test_aging_never_exceeds_base() {
        let queue = ReadyQueue::new();
        queue.enqueue(ready(1, 4, 0));
        queue.apply_aging(5, 1_000_000);

        let head = queue.dequeue().unwrap();
        assert_eq!(head.read().effective_priority, 0);
        assert_eq!(head.read().base_priority, 4);
    }
}
