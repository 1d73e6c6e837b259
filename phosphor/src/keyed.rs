//! Keyed cells: a map lazily populating one cell per key.
use crate::{cell::ClearCell, error::Error, event::Event};
use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

type KeyedExpr<K, T> = dyn FnMut(&K) -> Result<T, Error>;
type KeyedListener<K, T> = dyn FnMut(&K, &Event<T>);

/// A key → cell store.
///
/// [`apply`](CellMap::apply) returns the cell for a key, creating it on first
/// use from the keyed expression. The map listens on every child cell: a
/// child that is invalidated or cleared is forgotten together with its key,
/// while an explicitly `set` child is retained. Every other event is
/// forwarded to the map's listener with the key prepended.
pub struct CellMap<K, T> {
    inner: Rc<MapInner<K, T>>,
}

struct MapInner<K, T> {
    /// Children in insertion order. Maps are small; lookup is a linear scan.
    cells: RefCell<Vec<(K, ClearCell<T>)>>,
    expr: Rc<RefCell<KeyedExpr<K, T>>>,
    listener: Option<Rc<RefCell<KeyedListener<K, T>>>>,
}

impl<K, T> Clone for CellMap<K, T> {
    fn clone(&self) -> Self {
        CellMap {
            inner: self.inner.clone(),
        }
    }
}

impl<K: Clone + PartialEq + 'static, T: Clone + 'static> CellMap<K, T> {
    /// Creates a map computing the cell for key `k` with `expr(k)`.
    pub fn new(expr: impl FnMut(&K) -> Result<T, Error> + 'static) -> CellMap<K, T> {
        CellMap {
            inner: Rc::new(MapInner {
                cells: RefCell::new(Vec::new()),
                expr: Rc::new(RefCell::new(expr)),
                listener: None,
            }),
        }
    }

    /// Like [`CellMap::new`], with a listener receiving each child cell's
    /// events together with its key.
    pub fn with_listener(
        expr: impl FnMut(&K) -> Result<T, Error> + 'static,
        listener: impl FnMut(&K, &Event<T>) + 'static,
    ) -> CellMap<K, T> {
        CellMap {
            inner: Rc::new(MapInner {
                cells: RefCell::new(Vec::new()),
                expr: Rc::new(RefCell::new(expr)),
                listener: Some(Rc::new(RefCell::new(listener))),
            }),
        }
    }

    /// Returns the cell for `key`, creating it if absent.
    pub fn apply(&self, key: K) -> ClearCell<T> {
        if let Some((_, cell)) = self.inner.cells.borrow().iter().find(|(k, _)| *k == key) {
            return cell.clone();
        }

        let expr = self.inner.expr.clone();
        let expr_key = key.clone();
        // the child listener only holds the map weakly, so dropping the map
        // drops its children
        let map = Rc::downgrade(&self.inner);
        let listener_key = key.clone();
        let cell = ClearCell::with_listener(
            move || (expr.borrow_mut())(&expr_key),
            move |event| MapInner::on_child_event(&map, &listener_key, event),
        );
        self.inner.cells.borrow_mut().push((key, cell.clone()));
        cell
    }

    /// Keys of the currently cached children, in insertion order.
    pub fn keys(&self) -> Result<Vec<K>, Error> {
        let cells = self.inner.cells.borrow();
        let mut keys = Vec::new();
        for (key, cell) in cells.iter() {
            if cell.is_cached()? {
                keys.push(key.clone());
            }
        }
        Ok(keys)
    }

    /// Whether a cell exists for `key` (cached or not).
    pub fn contains(&self, key: &K) -> bool {
        self.inner.cells.borrow().iter().any(|(k, _)| k == key)
    }
}

impl<K: Clone + PartialEq + 'static, T: Clone + 'static> MapInner<K, T> {
    fn on_child_event(map: &Weak<MapInner<K, T>>, key: &K, event: &Event<T>) {
        let map = match map.upgrade() {
            Some(map) => map,
            None => return,
        };
        match event {
            // an invalidated or cleared entry is forgotten entirely
            Event::Invalidated | Event::Cleared => {
                map.cells.borrow_mut().retain(|(k, _)| k != key);
            }
            other => {
                if let Some(listener) = &map.listener {
                    (listener.borrow_mut())(key, other);
                }
            }
        }
    }
}
