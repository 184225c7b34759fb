use crate::model::{Grouped, Uid};

/// Call-scoped cursor handing out node uids 1, 2, 3, ...
///
/// Owned by one top-level expansion and threaded by `&mut` through every
/// recursive step so that numbering never restarts mid-tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UidCounter {
    next: Uid,
}

impl UidCounter {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: Uid) -> Self {
        Self { next: first }
    }

    pub fn next(&mut self) -> Uid {
        let uid = self.next;
        self.next += 1;
        uid
    }

    /// The value the next call to [`UidCounter::next`] will return.
    pub fn peek(&self) -> Uid {
        self.next
    }
}

impl Default for UidCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Append `item` to the group named `list_name`, creating the group on first use.
pub fn push_grouped<T>(groups: &mut Grouped<T>, list_name: &str, item: T) {
    match groups.get_mut(list_name) {
        Some(group) => group.push(item),
        None => {
            groups.insert(list_name.to_string(), vec![item]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_is_sequential() {
        let mut counter = UidCounter::new();
        assert_eq!(counter.next(), 1);
        assert_eq!(counter.next(), 2);
        assert_eq!(counter.peek(), 3);
    }

    #[test]
    fn test_push_grouped_creates_group_on_first_use() {
        let mut groups: Grouped<u32> = Grouped::new();
        push_grouped(&mut groups, "alt1", 1);
        push_grouped(&mut groups, "default", 2);
        push_grouped(&mut groups, "alt1", 3);

        assert_eq!(groups.keys().cloned().collect::<Vec<_>>(), vec!["alt1", "default"]);
        assert_eq!(groups["alt1"], vec![1, 3]);
    }
}
