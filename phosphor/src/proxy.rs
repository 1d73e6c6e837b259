//! Non-caching stand-ins for cells.
//!
//! A proxy implements the access traits by delegating to user callbacks. It
//! holds no cache slot and never appears in the dependency graph. When a
//! proxy getter reads engine cells, those reads are tracked against the
//! evaluating cell as usual, so a proxy can redirect one cell-shaped member
//! to another cell without interposing an extra graph node.
use crate::{
    access::{Clearable, Readable, Writable},
    error::Error,
};
use std::{cell::RefCell, rc::Rc};

type Getter<T> = dyn FnMut() -> Result<T, Error>;
type Setter<T> = dyn FnMut(T) -> Result<(), Error>;
type Clearer = dyn FnMut() -> Result<(), Error>;

/// Read-only proxy.
pub struct ReadProxy<T> {
    getter: Rc<RefCell<Getter<T>>>,
}

impl<T> Clone for ReadProxy<T> {
    fn clone(&self) -> Self {
        ReadProxy {
            getter: self.getter.clone(),
        }
    }
}

impl<T> ReadProxy<T> {
    pub fn new(getter: impl FnMut() -> Result<T, Error> + 'static) -> ReadProxy<T> {
        ReadProxy {
            getter: Rc::new(RefCell::new(getter)),
        }
    }
}

impl<T> Readable<T> for ReadProxy<T> {
    fn get(&self) -> Result<T, Error> {
        (self.getter.borrow_mut())()
    }
}

/// Read/write proxy.
pub struct WriteProxy<T> {
    getter: Rc<RefCell<Getter<T>>>,
    setter: Rc<RefCell<Setter<T>>>,
}

impl<T> Clone for WriteProxy<T> {
    fn clone(&self) -> Self {
        WriteProxy {
            getter: self.getter.clone(),
            setter: self.setter.clone(),
        }
    }
}

impl<T> WriteProxy<T> {
    pub fn new(
        getter: impl FnMut() -> Result<T, Error> + 'static,
        setter: impl FnMut(T) -> Result<(), Error> + 'static,
    ) -> WriteProxy<T> {
        WriteProxy {
            getter: Rc::new(RefCell::new(getter)),
            setter: Rc::new(RefCell::new(setter)),
        }
    }

    /// A read-only view sharing this proxy's getter.
    pub fn read(&self) -> ReadProxy<T> {
        ReadProxy {
            getter: self.getter.clone(),
        }
    }
}

impl<T> Readable<T> for WriteProxy<T> {
    fn get(&self) -> Result<T, Error> {
        (self.getter.borrow_mut())()
    }
}

impl<T> Writable<T> for WriteProxy<T> {
    fn set(&self, value: T) -> Result<(), Error> {
        (self.setter.borrow_mut())(value)
    }
}

/// Read/write/clear proxy.
pub struct ClearProxy<T> {
    getter: Rc<RefCell<Getter<T>>>,
    setter: Rc<RefCell<Setter<T>>>,
    clearer: Rc<RefCell<Clearer>>,
}

impl<T> Clone for ClearProxy<T> {
    fn clone(&self) -> Self {
        ClearProxy {
            getter: self.getter.clone(),
            setter: self.setter.clone(),
            clearer: self.clearer.clone(),
        }
    }
}

impl<T> ClearProxy<T> {
    pub fn new(
        getter: impl FnMut() -> Result<T, Error> + 'static,
        setter: impl FnMut(T) -> Result<(), Error> + 'static,
        clearer: impl FnMut() -> Result<(), Error> + 'static,
    ) -> ClearProxy<T> {
        ClearProxy {
            getter: Rc::new(RefCell::new(getter)),
            setter: Rc::new(RefCell::new(setter)),
            clearer: Rc::new(RefCell::new(clearer)),
        }
    }

    /// A read/write view sharing this proxy's getter and setter.
    pub fn write(&self) -> WriteProxy<T> {
        WriteProxy {
            getter: self.getter.clone(),
            setter: self.setter.clone(),
        }
    }

    /// A read-only view sharing this proxy's getter.
    pub fn read(&self) -> ReadProxy<T> {
        ReadProxy {
            getter: self.getter.clone(),
        }
    }
}

impl<T> Readable<T> for ClearProxy<T> {
    fn get(&self) -> Result<T, Error> {
        (self.getter.borrow_mut())()
    }
}

impl<T> Writable<T> for ClearProxy<T> {
    fn set(&self, value: T) -> Result<(), Error> {
        (self.setter.borrow_mut())(value)
    }
}

impl<T> Clearable<T> for ClearProxy<T> {
    fn clear(&self) -> Result<(), Error> {
        (self.clearer.borrow_mut())()
    }
}
