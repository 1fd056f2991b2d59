//! Heap consistency checking: walking the block chain and the free-list index, cross-checking
//! them against each other and against the boundary-tag invariants.

use crate::block::{header_addr, next_block, read_next_link, read_prev_link, read_tag, ALIGNMENT, DSIZE};
use crate::engine::Heap;
use crate::freelist::class_of;
use crate::provider::HeapProvider;

/// A single consistency violation found by a heap walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// The prologue's header/footer don't read back as an 8-byte always-allocated sentinel.
    BadPrologue,
    /// The epilogue's header isn't a zero-size, allocated sentinel.
    BadEpilogue,
    /// A block's payload address isn't 8-byte aligned.
    Misaligned { addr: usize },
    /// A block's header and footer tags disagree.
    HeaderFooterMismatch { addr: usize },
    /// Two physically adjacent blocks are both free; they should have been coalesced.
    AdjacentFreeBlocks { first: usize, second: usize },
    /// A free-list link points outside the heap provider's reported bounds.
    LinkOutOfBounds { addr: usize },
    /// Walking forward from a node and back via `prev` doesn't return to the same node.
    BrokenBackLink { addr: usize },
    /// A free block sits in a list whose class doesn't match its own size.
    WrongSizeClass { addr: usize, size: usize, class: usize },
    /// The number of free blocks found walking the block chain doesn't match the number found
    /// walking the free lists.
    FreeListCountMismatch { counted: usize, walked: usize },
}

/// One block observed during a heap walk.
#[derive(Debug, Clone, Copy)]
pub struct BlockInfo {
    pub addr: usize,
    pub size: usize,
    pub allocated: bool,
}

pub(crate) enum CheckEvent {
    Block(BlockInfo),
    Violation(Violation),
}

impl<P: HeapProvider, const N: usize> Heap<P, N> {
    /// Walks the physical block chain and the free-list index once, calling `sink` for every
    /// block visited and every violation found. Shared by [`Heap::check`] (which logs) and
    /// [`Heap::audit`] (which collects, under the `std` feature).
    pub(crate) fn walk(&self, mut sink: impl FnMut(CheckEvent)) {
        let (lo, hi) = self.provider.bounds();

        unsafe {
            let ptag = read_tag(header_addr(self.prologue));
            if ptag.size() != DSIZE || !ptag.is_allocated() {
                sink(CheckEvent::Violation(Violation::BadPrologue));
            }

            let mut bp = self.prologue;
            let mut walked_free = 0usize;

            loop {
                let tag = read_tag(header_addr(bp));
                let size = tag.size();

                if size == 0 {
                    if !tag.is_allocated() {
                        sink(CheckEvent::Violation(Violation::BadEpilogue));
                    }
                    break;
                }

                if bp % ALIGNMENT != 0 {
                    sink(CheckEvent::Violation(Violation::Misaligned { addr: bp }));
                }

                let footer = read_tag(bp + size - DSIZE);
                if footer.as_word() != tag.as_word() {
                    sink(CheckEvent::Violation(Violation::HeaderFooterMismatch { addr: bp }));
                }

                if !tag.is_allocated() {
                    walked_free += 1;
                    let successor = next_block(bp);
                    let successor_tag = read_tag(header_addr(successor));
                    if successor_tag.size() != 0 && !successor_tag.is_allocated() {
                        sink(CheckEvent::Violation(Violation::AdjacentFreeBlocks {
                            first: bp,
                            second: successor,
                        }));
                    }
                }

                sink(CheckEvent::Block(BlockInfo { addr: bp, size, allocated: tag.is_allocated() }));
                bp = next_block(bp);
            }

            let mut listed_free = 0usize;
            for class in 0..N {
                let mut node = self.free_lists.head(class);
                while node != 0 {
                    if node < lo || node >= hi {
                        sink(CheckEvent::Violation(Violation::LinkOutOfBounds { addr: node }));
                    }

                    let next = read_next_link(node);
                    if next != 0 && read_prev_link(next) != node {
                        sink(CheckEvent::Violation(Violation::BrokenBackLink { addr: next }));
                    }

                    let size = read_tag(header_addr(node)).size();
                    if class_of(size) != class {
                        sink(CheckEvent::Violation(Violation::WrongSizeClass { addr: node, size, class }));
                    }

                    listed_free += 1;
                    node = next;
                }
            }

            if listed_free != walked_free {
                sink(CheckEvent::Violation(Violation::FreeListCountMismatch {
                    counted: listed_free,
                    walked: walked_free,
                }));
            }
        }
    }

    /// Walks the heap, logging every block (if `verbose`) and every consistency violation found.
    /// Never panics or aborts on a violation; this is a diagnostic, not an enforcement point.
    pub fn check(&self, verbose: bool) {
        self.walk(|event| match event {
            CheckEvent::Block(b) => {
                if verbose {
                    log::debug!("block {:#x}: size={} allocated={}", b.addr, b.size, b.allocated);
                }
            }
            CheckEvent::Violation(v) => log::error!("heap consistency violation: {v:?}"),
        });
    }
}

#[cfg(feature = "std")]
impl<P: HeapProvider, const N: usize> Heap<P, N> {
    /// Same walk as [`Heap::check`], but collects violations into a `Vec` instead of logging
    /// them. Test-only surface, gated behind the `std` feature.
    pub fn audit(&self) -> std::vec::Vec<Violation> {
        let mut violations = std::vec::Vec::new();
        self.walk(|event| {
            if let CheckEvent::Violation(v) = event {
                violations.push(v);
            }
        });
        violations
    }

    /// Enumerates every block in the heap in address order. Test-only surface.
    pub fn blocks(&self) -> std::vec::Vec<BlockInfo> {
        let mut blocks = std::vec::Vec::new();
        self.walk(|event| {
            if let CheckEvent::Block(b) = event {
                blocks.push(b);
            }
        });
        blocks
    }
}
