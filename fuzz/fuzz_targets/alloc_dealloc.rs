#![no_main]

#[macro_use]
extern crate arbitrary;

use libfuzzer_sys::fuzz_target;
use libfuzzer_sys::arbitrary::Arbitrary;

use shelf_atlas::*;

#[derive(Copy, Clone, Arbitrary, Debug)]
enum Evt {
    Alloc(i32, i32),
    Dealloc(usize),
}

fuzz_target!(|events: Vec<Evt>| {
    let mut atlas = AtlasAllocator::new(size2(2048, 2048));

    let mut allocations: Vec<Allocation> = Vec::new();

    for evt in &events {
        match *evt {
            Evt::Alloc(w, h) => {
                if w < 1 || h < 1 || w > 2048 || h > 2048 {
                    continue;
                }

                if let Ok(alloc) = atlas.allocate(size2(w, h)) {
                    assert!(alloc.rectangle.size().width >= w);
                    assert!(alloc.rectangle.size().height >= h);

                    for previous in &allocations {
                        assert!(!alloc.rectangle.intersects(&previous.rectangle));
                    }

                    allocations.push(alloc);
                }
            }
            Evt::Dealloc(idx) => {
                if !allocations.is_empty() {
                    let idx = idx % allocations.len();

                    atlas.free(allocations[idx]);
                    allocations.swap_remove(idx);
                }
            }
        }
    }

    for alloc in allocations {
        atlas.free(alloc);
    }

    assert!(atlas.is_empty());
    assert_eq!(atlas.coverage(), 0);
});
