/// Objects kept in a [Pool] which can drop their state without being freed.
pub(crate) trait Recyclable {
    /// Clears all state and marks the object invalid.
    fn hibernate(&mut self);
    /// Marks a hibernated object valid again.
    fn recycle(&mut self);
}

struct Slot<T> {
    generation: u32,
    live: bool,
    value: Option<T>,
}

/// A generational slab with two free-lists.
///
/// `hibernated` holds slots whose objects are constructed but unused.
/// `reclaimed` holds slots whose objects were freed; their raw ids are
/// reissued before the slab grows.
pub(crate) struct Pool<T> {
    slots: Vec<Slot<T>>,
    hibernated: Vec<usize>,
    reclaimed: Vec<usize>,
    live: usize,
}

/// How [Pool::acquire] satisfied a request.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Acquired {
    Recycled,
    Constructed,
}

impl<T: Recyclable> Pool<T> {
    pub fn new() -> Self {
        Self {
            slots: vec![],
            hibernated: vec![],
            reclaimed: vec![],
            live: 0,
        }
    }

    /// Returns `(raw, generation)` of a live object.
    pub fn acquire<F>(&mut self, make: F) -> (usize, u32, Acquired)
    where
        F: FnOnce() -> T,
    {
        self.live += 1;
        if let Some(raw) = self.hibernated.pop() {
            let slot = &mut self.slots[raw];
            debug_assert!(!slot.live);
            slot.generation = slot.generation.wrapping_add(1);
            slot.live = true;
            if let Some(v) = slot.value.as_mut() {
                v.recycle();
            }
            return (raw, slot.generation, Acquired::Recycled);
        }
        if let Some(raw) = self.reclaimed.pop() {
            let slot = &mut self.slots[raw];
            slot.generation = slot.generation.wrapping_add(1);
            slot.live = true;
            slot.value = Some(make());
            return (raw, slot.generation, Acquired::Constructed);
        }
        let raw = self.slots.len();
        self.slots.push(Slot {
            generation: 0,
            live: true,
            value: Some(make()),
        });
        (raw, 0, Acquired::Constructed)
    }

    /// Hibernates a live object and returns it to the free-list.
    pub fn release(&mut self, raw: usize) {
        let slot = &mut self.slots[raw];
        debug_assert!(slot.live);
        slot.live = false;
        if let Some(v) = slot.value.as_mut() {
            v.hibernate();
        }
        self.live -= 1;
        self.hibernated.push(raw);
    }

    /// Constructs `n` objects straight into the free-list.
    pub fn reserve<F>(&mut self, n: usize, mut make: F)
    where
        F: FnMut() -> T,
    {
        self.slots.reserve(n.saturating_sub(self.reclaimed.len()));
        self.hibernated.reserve(n);
        for _ in 0..n {
            let mut value = make();
            value.hibernate();
            let raw = if let Some(raw) = self.reclaimed.pop() {
                self.slots[raw].value = Some(value);
                raw
            } else {
                self.slots.push(Slot {
                    generation: 0,
                    live: false,
                    value: Some(value),
                });
                self.slots.len() - 1
            };
            self.hibernated.push(raw);
        }
    }

    /// Frees every hibernated object. Their raw ids become reclaimable.
    pub fn empty_reserves(&mut self) {
        for raw in self.hibernated.drain(..) {
            self.slots[raw].value = None;
            self.reclaimed.push(raw);
        }
    }

    /// Orders both free-lists so that ascending raw ids are reissued first.
    pub fn restore_order(&mut self) {
        self.hibernated.sort_unstable_by(|a, b| b.cmp(a));
        self.reclaimed.sort_unstable_by(|a, b| b.cmp(a));
    }

    pub fn get(&self, raw: usize, generation: u32) -> Option<&T> {
        self.slots
            .get(raw)
            .filter(|s| s.live && s.generation == generation)
            .and_then(|s| s.value.as_ref())
    }

    pub fn get_mut(&mut self, raw: usize, generation: u32) -> Option<&mut T> {
        self.slots
            .get_mut(raw)
            .filter(|s| s.live && s.generation == generation)
            .and_then(|s| s.value.as_mut())
    }

    pub fn contains(&self, raw: usize, generation: u32) -> bool {
        self.get(raw, generation).is_some()
    }

    pub fn live_len(&self) -> usize {
        self.live
    }

    pub fn hibernated_len(&self) -> usize {
        self.hibernated.len()
    }

    #[cfg(test)]
    pub fn reclaimed_len(&self) -> usize {
        self.reclaimed.len()
    }

    /// Live objects with their raw ids and generations, in raw id order.
    pub fn iter_live(&self) -> impl Iterator<Item = (usize, u32, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(raw, s)| {
            if s.live {
                s.value.as_ref().map(|v| (raw, s.generation, v))
            } else {
                None
            }
        })
    }
}
