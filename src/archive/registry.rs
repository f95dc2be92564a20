use super::layout::Layout;
use super::lump::Lump;


#[derive(Debug)]
enum Slot {
    Vacant,
    Filled(Lump),
    /// Already streamed to the container; the payload is gone but the slot still counts as used.
    Written,
}

/// Fixed table of lump slots, one per category the layout defines plus the metadata slot.
///
/// Each slot may be created once per build.  Asking for a slot out of range, creating one twice,
/// or fetching one that was never created are all collaborator bugs, and panic.
#[derive(Debug)]
pub struct LumpRegistry {
    layout: &'static Layout,
    slots: Box<[Slot]>,
}

impl LumpRegistry {
    pub fn new(layout: &'static Layout) -> Self {
        let slots: Vec<Slot> = (0..layout.slot_count()).map(|_| Slot::Vacant).collect();
        LumpRegistry {
            layout,
            slots: slots.into_boxed_slice(),
        }
    }

    pub fn layout(&self) -> &'static Layout {
        self.layout
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    fn check_id(&self, id: usize) {
        if id >= self.slots.len() {
            panic!("INTERNAL ERROR: lump slot {} out of range (0..{})", id, self.slots.len());
        }
    }

    /// Allocate an empty lump for `id` and hand it back for filling.
    pub fn create_slot(&mut self, id: usize) -> &mut Lump {
        self.check_id(id);
        match self.slots[id] {
            Slot::Vacant => {}
            _ => panic!("INTERNAL ERROR: lump slot [{}] already created", id),
        }
        self.slots[id] = Slot::Filled(Lump::new());
        match self.slots[id] {
            Slot::Filled(ref mut lump) => lump,
            _ => unreachable!(),
        }
    }

    /// The lump previously created for `id`.
    pub fn get_slot(&mut self, id: usize) -> &mut Lump {
        self.check_id(id);
        match self.slots[id] {
            Slot::Filled(ref mut lump) => lump,
            Slot::Vacant => panic!("INTERNAL ERROR: lump slot [{}] was never created", id),
            Slot::Written => panic!("INTERNAL ERROR: lump slot [{}] was already written out", id),
        }
    }

    pub fn lump(&self, id: usize) -> Option<&Lump> {
        match self.slots.get(id) {
            Some(&Slot::Filled(ref lump)) => Some(lump),
            _ => None,
        }
    }

    /// Whether `id` has been created this build, including slots already streamed out.
    pub fn is_created(&self, id: usize) -> bool {
        match self.slots.get(id) {
            Some(&Slot::Vacant) | None => false,
            _ => true,
        }
    }

    /// Hand the payload over for writing, leaving the slot marked as used.
    pub fn take(&mut self, id: usize) -> Option<Lump> {
        self.check_id(id);
        match ::std::mem::replace(&mut self.slots[id], Slot::Written) {
            Slot::Filled(lump) => Some(lump),
            Slot::Vacant => {
                self.slots[id] = Slot::Vacant;
                None
            }
            Slot::Written => None,
        }
    }

    /// Forget every slot, ready for a fresh build.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = Slot::Vacant;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use archive::QUAKE1;

    #[test]
    fn create_then_fill() {
        let mut lumps = LumpRegistry::new(&QUAKE1);
        assert_eq!(lumps.len(), 16);
        assert!(!lumps.is_created(3));

        lumps.create_slot(3).append(b"hel");
        lumps.get_slot(3).append(b"lo");
        assert!(lumps.is_created(3));
        assert_eq!(lumps.lump(3).unwrap().as_bytes(), b"hello");
        assert!(lumps.lump(4).is_none());
    }

    #[test]
    fn take_marks_slot_used() {
        let mut lumps = LumpRegistry::new(&QUAKE1);
        lumps.create_slot(0).append(b"ABCD");
        assert_eq!(lumps.take(0).unwrap().as_bytes(), b"ABCD");
        assert!(lumps.take(0).is_none());
        assert!(lumps.is_created(0));
        assert!(lumps.take(1).is_none());
        assert!(!lumps.is_created(1));
    }

    #[test]
    fn clear_allows_recreation() {
        let mut lumps = LumpRegistry::new(&QUAKE1);
        lumps.create_slot(2);
        lumps.clear();
        assert!(!lumps.is_created(2));
        lumps.create_slot(2);
    }

    #[test]
    #[should_panic(expected = "already created")]
    fn duplicate_creation_is_fatal() {
        let mut lumps = LumpRegistry::new(&QUAKE1);
        lumps.create_slot(5);
        lumps.create_slot(5);
    }

    #[test]
    #[should_panic(expected = "already created")]
    fn recreating_a_written_slot_is_fatal() {
        let mut lumps = LumpRegistry::new(&QUAKE1);
        lumps.create_slot(5);
        lumps.take(5);
        lumps.create_slot(5);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_is_fatal() {
        let mut lumps = LumpRegistry::new(&QUAKE1);
        lumps.create_slot(16);
    }

    #[test]
    #[should_panic(expected = "never created")]
    fn fetching_a_vacant_slot_is_fatal() {
        let mut lumps = LumpRegistry::new(&QUAKE1);
        lumps.get_slot(0);
    }
}
