//! [`Room`]-related read definitions.

#[cfg(doc)]
use crate::domain::Room;

pub mod list {
    //! [`Room`] list definitions.

    use crate::domain::{house, Room};
    #[cfg(doc)]
    use crate::domain::House;

    /// Item of a [`Room`] list.
    #[derive(Clone, Debug)]
    pub struct Item {
        /// Listed [`Room`].
        pub room: Room,

        /// [`house::Number`] of the [`House`] the [`Room`] belongs to.
        pub house_number: house::Number,
    }
}
