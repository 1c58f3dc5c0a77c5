//! Reusable span buffer.

// ============================================================================
// SpanAllocator
// ============================================================================

/// Scratch buffer handed to span generators, one scanline at a time.
///
/// Storage grows in steps of 256 elements and is never released, so a
/// renderer allocates at most a handful of times per frame.
#[derive(Debug, Clone)]
pub struct SpanAllocator<C> {
    span: Vec<C>,
}

const ALLOC_STEP_SHIFT: u32 = 8;

impl<C: Default + Clone> SpanAllocator<C> {
    pub fn new() -> Self {
        Self { span: Vec::new() }
    }

    /// Returns `len` default-valued elements, valid until the next call.
    pub fn allocate(&mut self, len: usize) -> &mut [C] {
        if len > self.span.len() {
            let step = 1usize << ALLOC_STEP_SHIFT;
            let new_size = (len + step - 1) / step * step;
            log::trace!("span buffer grows to {new_size}");
            self.span.resize(new_size, C::default());
        }
        let out = &mut self.span[..len];
        out.fill(C::default());
        out
    }

    /// Current capacity in elements.
    pub fn max_span_len(&self) -> usize {
        self.span.len()
    }
}

impl<C: Default + Clone> Default for SpanAllocator<C> {
    fn default() -> Self {
        Self::new()
    }
}
