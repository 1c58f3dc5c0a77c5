//! Two-stage span pipeline: generate, then convert in place.

use crate::span_generator::SpanGenerator;

/// In-place post-processing of a generated span.
pub trait SpanConverterFunction {
    type Color;

    fn prepare(&mut self) {}

    fn convert(&mut self, span: &mut [Self::Color], x: i32, y: i32, len: u32);
}

/// Runs `SG` and then `SC` over the same span.
#[derive(Debug, Clone)]
pub struct SpanConverter<SG, SC> {
    span_gen: SG,
    span_cnv: SC,
}

impl<SG, SC> SpanConverter<SG, SC>
where
    SG: SpanGenerator,
    SC: SpanConverterFunction<Color = SG::Color>,
{
    pub fn new(span_gen: SG, span_cnv: SC) -> Self {
        Self { span_gen, span_cnv }
    }

    pub fn generator(&self) -> &SG {
        &self.span_gen
    }

    pub fn generator_mut(&mut self) -> &mut SG {
        &mut self.span_gen
    }

    pub fn converter(&self) -> &SC {
        &self.span_cnv
    }

    pub fn converter_mut(&mut self) -> &mut SC {
        &mut self.span_cnv
    }
}

impl<SG, SC> SpanGenerator for SpanConverter<SG, SC>
where
    SG: SpanGenerator,
    SC: SpanConverterFunction<Color = SG::Color>,
{
    type Color = SG::Color;

    fn prepare(&mut self) {
        self.span_gen.prepare();
        self.span_cnv.prepare();
    }

    fn generate(&mut self, span: &mut [Self::Color], x: i32, y: i32, len: u32) {
        self.span_gen.generate(span, x, y, len);
        self.span_cnv.convert(span, x, y, len);
    }
}
