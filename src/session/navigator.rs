//! Position within the ordered image list.

use crate::error::ReviewError;

/// Outcome of a navigation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    /// The current image changed.
    Moved { from: usize, to: usize },
    /// `previous` was requested on the first image; nothing moved.
    AtFirst,
    /// `next` was requested on the last image; nothing moved.
    AtLast,
}

impl Navigation {
    pub fn moved(&self) -> bool {
        matches!(self, Navigation::Moved { .. })
    }
}

/// Current image index over a non-empty list of images.
///
/// Every move first hands the current index to a save callback; if saving
/// fails the index stays where it was.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigator {
    len: usize,
    index: usize,
}

impl Navigator {
    /// Starts at the first of `len` images.
    ///
    /// # Errors
    /// `EmptyLabelFile` if `len` is zero.
    pub fn new(len: usize) -> Result<Self, ReviewError> {
        if len == 0 {
            return Err(ReviewError::EmptyLabelFile);
        }
        Ok(Self { len, index: 0 })
    }

    /// Starts at `index` of `len` images.
    ///
    /// # Errors
    /// `EmptyLabelFile` if `len` is zero, `ImageIndexOutOfRange` if `index`
    /// is past the end.
    pub fn starting_at(len: usize, index: usize) -> Result<Self, ReviewError> {
        let mut navigator = Self::new(len)?;
        if index >= len {
            return Err(ReviewError::ImageIndexOutOfRange { index, len });
        }
        navigator.index = index;
        Ok(navigator)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.len
    }

    /// Saves, then moves to the next image unless already on the last.
    pub fn next<F>(&mut self, save: F) -> Result<Navigation, ReviewError>
    where
        F: FnOnce(usize) -> Result<(), ReviewError>,
    {
        save(self.index)?;
        if self.is_last() {
            tracing::warn!(index = self.index, "this is the last image");
            return Ok(Navigation::AtLast);
        }
        Ok(self.move_to(self.index + 1))
    }

    /// Saves, then moves to the previous image unless already on the first.
    pub fn previous<F>(&mut self, save: F) -> Result<Navigation, ReviewError>
    where
        F: FnOnce(usize) -> Result<(), ReviewError>,
    {
        save(self.index)?;
        if self.is_first() {
            tracing::warn!(index = self.index, "this is the first image");
            return Ok(Navigation::AtFirst);
        }
        Ok(self.move_to(self.index - 1))
    }

    /// Saves, then jumps to `index`.
    ///
    /// # Errors
    /// `ImageIndexOutOfRange` without saving if `index` is past the end.
    pub fn go_to<F>(&mut self, index: usize, save: F) -> Result<Navigation, ReviewError>
    where
        F: FnOnce(usize) -> Result<(), ReviewError>,
    {
        if index >= self.len {
            return Err(ReviewError::ImageIndexOutOfRange {
                index,
                len: self.len,
            });
        }
        save(self.index)?;
        Ok(self.move_to(index))
    }

    /// Undoes a move whose target could not be opened.
    pub(crate) fn revert(&mut self, navigation: Navigation) {
        if let Navigation::Moved { from, to } = navigation {
            tracing::debug!(from = to, to = from, "navigation reverted");
            self.index = from;
        }
    }

    fn move_to(&mut self, to: usize) -> Navigation {
        let from = self.index;
        self.index = to;
        tracing::debug!(from, to, "navigated");
        Navigation::Moved { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn save(log: &RefCell<Vec<usize>>, index: usize) -> Result<(), ReviewError> {
        log.borrow_mut().push(index);
        Ok(())
    }

    #[test]
    fn empty_list_is_rejected() {
        assert!(matches!(Navigator::new(0), Err(ReviewError::EmptyLabelFile)));
    }

    #[test]
    fn starting_position_is_checked() {
        assert_eq!(Navigator::starting_at(3, 2).expect("in range").index(), 2);
        assert!(matches!(
            Navigator::starting_at(3, 3),
            Err(ReviewError::ImageIndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn next_saves_then_moves() {
        let log = RefCell::new(Vec::new());
        let mut nav = Navigator::new(3).expect("non-empty");

        let nav_result = nav.next(|i| save(&log, i)).expect("saved");
        assert_eq!(nav_result, Navigation::Moved { from: 0, to: 1 });
        assert_eq!(nav.index(), 1);
        assert_eq!(*log.borrow(), vec![0]);
    }

    #[test]
    fn boundaries_warn_but_still_save() {
        let log = RefCell::new(Vec::new());
        let mut nav = Navigator::new(2).expect("non-empty");

        assert_eq!(nav.previous(|i| save(&log, i)).expect("saved"), Navigation::AtFirst);
        assert_eq!(nav.index(), 0);

        nav.next(|i| save(&log, i)).expect("saved");
        assert_eq!(nav.next(|i| save(&log, i)).expect("saved"), Navigation::AtLast);
        assert_eq!(nav.index(), 1);
        assert_eq!(*log.borrow(), vec![0, 0, 1]);
    }

    #[test]
    fn go_to_out_of_range_does_not_save() {
        let log = RefCell::new(Vec::new());
        let mut nav = Navigator::new(3).expect("non-empty");

        let err = nav.go_to(3, |i| save(&log, i)).expect_err("out of range");
        assert!(matches!(err, ReviewError::ImageIndexOutOfRange { index: 3, len: 3 }));
        assert!(log.borrow().is_empty());

        assert_eq!(
            nav.go_to(2, |i| save(&log, i)).expect("in range"),
            Navigation::Moved { from: 0, to: 2 }
        );
        assert_eq!(*log.borrow(), vec![0]);
    }

    #[test]
    fn failed_save_keeps_position() {
        let mut nav = Navigator::new(3).expect("non-empty");
        let result = nav.next(|_| Err(ReviewError::EmptyLabelFile));
        assert!(result.is_err());
        assert_eq!(nav.index(), 0);
    }

    #[test]
    fn revert_restores_previous_index() {
        let log = RefCell::new(Vec::new());
        let mut nav = Navigator::new(3).expect("non-empty");

        let moved = nav.go_to(2, |i| save(&log, i)).expect("in range");
        nav.revert(moved);
        assert_eq!(nav.index(), 0);

        nav.revert(Navigation::AtLast);
        assert_eq!(nav.index(), 0);
    }
}
