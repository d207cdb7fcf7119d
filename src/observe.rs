/// Change notifications for observable minimap state
///
/// Operations report what they changed; subscribers decide what to
/// re-read. Notifications are fire-and-forget and not deduplicated.

use std::fmt;

/// An observable value (or the rendered minimap) that changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    Loaded,
    ImagePath,
    PositionX,
    PositionY,
    TotalWidth,
    TotalHeight,
    ImageWidth,
    ImageHeight,
    /// The composite needs repainting
    Redraw,
}

impl Change {
    /// Everything that follows from a new selection
    pub const SELECTION: [Change; 4] = [
        Change::ImagePath,
        Change::PositionX,
        Change::PositionY,
        Change::Redraw,
    ];

    /// Everything that follows from a new grid
    pub const ALL: [Change; 9] = [
        Change::ImagePath,
        Change::PositionX,
        Change::PositionY,
        Change::TotalWidth,
        Change::TotalHeight,
        Change::ImageWidth,
        Change::ImageHeight,
        Change::Loaded,
        Change::Redraw,
    ];
}

pub type SubscriptionId = usize;

#[derive(Default)]
pub struct Observers {
    next_id: SubscriptionId,
    subscribers: Vec<(SubscriptionId, Box<dyn FnMut(Change)>)>,
}

impl Observers {
    pub fn subscribe(&mut self, callback: impl FnMut(Change) + 'static) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns false if the id was not subscribed
    #[cfg(test)]
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn notify(&mut self, change: Change) {
        for (_, callback) in &mut self.subscribers {
            callback(change);
        }
    }

    pub fn notify_all(&mut self, changes: &[Change]) {
        for &change in changes {
            self.notify(change);
        }
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_subscribers_receive_changes_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::default();

        let sink = seen.clone();
        observers.subscribe(move |change| sink.borrow_mut().push(change));
        observers.notify_all(&Change::SELECTION);

        assert_eq!(*seen.borrow(), Change::SELECTION.to_vec());
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut observers = Observers::default();

        let sink = count.clone();
        let id = observers.subscribe(move |_| *sink.borrow_mut() += 1);
        observers.notify(Change::Redraw);

        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        observers.notify(Change::Redraw);

        assert_eq!(*count.borrow(), 1);
    }
}
