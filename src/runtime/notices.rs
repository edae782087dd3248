use std::collections::VecDeque;

/// Transient, dismissible user-facing messages: submit failures, plugin
/// errors, validation complaints. Non-fatal by definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    ticks_left: u32,
}

#[derive(Debug, Clone, Default)]
pub struct NoticeQueue {
    notices: VecDeque<Notice>,
    ttl_ticks: u32,
    max_visible: usize,
}

impl NoticeQueue {
    pub fn new(ttl_ticks: u32, max_visible: usize) -> Self {
        Self {
            notices: VecDeque::new(),
            ttl_ticks: ttl_ticks.max(1),
            max_visible: max_visible.max(1),
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.notices.push_back(Notice {
            message: message.into(),
            ticks_left: self.ttl_ticks,
        });
        while self.notices.len() > self.max_visible {
            self.notices.pop_front();
        }
    }

    /// Ages every notice by one tick; returns true when anything expired.
    pub fn tick(&mut self) -> bool {
        let before = self.notices.len();
        for notice in &mut self.notices {
            notice.ticks_left = notice.ticks_left.saturating_sub(1);
        }
        self.notices.retain(|notice| notice.ticks_left > 0);
        self.notices.len() != before
    }

    /// Drops the oldest notice (user dismissal).
    pub fn dismiss(&mut self) -> bool {
        self.notices.pop_front().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::NoticeQueue;

    #[test]
    fn notices_expire_after_ttl_ticks() {
        let mut queue = NoticeQueue::new(2, 4);
        queue.push("already voted");
        assert!(!queue.tick());
        assert!(queue.tick());
        assert!(queue.is_empty());
    }

    #[test]
    fn overflow_drops_oldest_first() {
        let mut queue = NoticeQueue::new(10, 2);
        queue.push("one");
        queue.push("two");
        queue.push("three");
        let messages: Vec<_> = queue.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["two", "three"]);
    }

    #[test]
    fn dismiss_removes_oldest() {
        let mut queue = NoticeQueue::new(10, 4);
        queue.push("stale");
        queue.push("fresh");
        assert!(queue.dismiss());
        let messages: Vec<_> = queue.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["fresh"]);
    }
}
