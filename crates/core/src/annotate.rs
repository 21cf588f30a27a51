//! Annotation runs
//!
//! Ties the geometry engine to a document: pair the selection, resolve the
//! centers, compute line and label geometry, and hand declarative creation
//! requests to the document.
//!
//! In incremental mode each pair is appended as soon as it is computed and a
//! later failure does not remove earlier pairs. Batched mode computes every
//! pair first and touches the document only when all of them succeeded.

use crate::center::center;
use crate::document::{CreationRequest, DocumentMutator, DocumentTree, LineRequest, TextRequest};
use crate::error::{AnnotateError, AnnotateResult};
use crate::geometry::Segment;
use crate::label::{place, LabelPlacement};
use crate::marker::{ensure_arrowhead, marker_url, ARROWHEAD_ID};
use crate::options::{ConnectorOptions, EmissionMode, UngeometricPolicy};
use crate::segment::{measured_length, offset_segment};
use crate::sequence::{sequence_entries, SelectionEntry};
use serde::Serialize;

/// Stroke settings of an annotation line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub stroke_width_mm: f64,
    pub marker_start: String,
    pub marker_end: String,
}

impl LineStyle {
    pub fn arrowheads(stroke_width_mm: f64) -> Self {
        Self {
            stroke_width_mm,
            marker_start: ARROWHEAD_ID.to_string(),
            marker_end: ARROWHEAD_ID.to_string(),
        }
    }

    /// Inline CSS for the path element
    pub fn to_css(&self) -> String {
        format!(
            "stroke:black;stroke-width:{}mm;fill:none;marker-start:{};marker-end:{}",
            self.stroke_width_mm,
            marker_url(&self.marker_start),
            marker_url(&self.marker_end),
        )
    }
}

/// Everything needed to draw one measured pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationSpec {
    pub from_id: String,
    pub to_id: String,
    /// Segment between the two centers
    pub measured: Segment,
    /// Visible line, shortened for the arrowheads
    pub line: Segment,
    pub line_style: LineStyle,
    /// Reported distance after scaling
    pub length: f64,
    pub label: LabelPlacement,
    pub font_size_px: f64,
}

impl AnnotationSpec {
    pub fn line_request(&self) -> LineRequest {
        let Segment { start, end } = self.line;
        LineRequest {
            d: format!("M {},{} L {},{}", start.x, start.y, end.x, end.y),
            style: self.line_style.to_css(),
        }
    }

    pub fn text_request(&self) -> TextRequest {
        let anchor = self.label.anchor;
        TextRequest {
            text: self.label.text.clone(),
            style: format!("font-size:{}px; text-anchor:middle", self.font_size_px),
            x: anchor.x,
            y: anchor.y,
            transform: format!(
                "rotate({},{},{})",
                self.label.rotation_degrees, anchor.x, anchor.y
            ),
        }
    }

    /// Line first, then its label
    pub fn requests(&self) -> [CreationRequest; 2] {
        [
            CreationRequest::Path(self.line_request()),
            CreationRequest::Text(self.text_request()),
        ]
    }
}

/// A pair left out under [`UngeometricPolicy::SkipPair`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedPair {
    pub from_id: String,
    pub to_id: String,
    pub reason: String,
}

/// Computed annotations, not yet written anywhere
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnnotationPlan {
    pub specs: Vec<AnnotationSpec>,
    pub skipped: Vec<SkippedPair>,
}

/// Outcome of a run that wrote into a document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnnotationReport {
    pub marker_created: bool,
    pub emitted: Vec<CreationRequest>,
    pub skipped: Vec<SkippedPair>,
}

impl AnnotationReport {
    /// Number of annotated pairs
    pub fn annotated_pairs(&self) -> usize {
        self.emitted.len() / 2
    }
}

/// Drives annotation runs with a fixed set of options
#[derive(Debug, Clone)]
pub struct Annotator {
    options: ConnectorOptions,
}

impl Annotator {
    pub fn new(options: ConnectorOptions) -> AnnotateResult<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Geometry for two already resolved centers
    pub fn spec_for(&self, from_id: &str, to_id: &str, measured: Segment) -> AnnotationSpec {
        let options = &self.options;
        let line = offset_segment(measured.start, measured.end, options.stroke_width);
        if !measured.is_degenerate() && line.is_reversed_by(&measured) {
            tracing::warn!(
                from = from_id,
                to = to_id,
                length = measured.length(),
                "arrowheads are longer than the line between the objects"
            );
        }

        let length = measured_length(&measured, options.length_metric) * options.scale_factor;
        let label = place(
            measured.start,
            measured.end,
            length,
            options.text_raise,
            &options.unit,
        );

        AnnotationSpec {
            from_id: from_id.to_string(),
            to_id: to_id.to_string(),
            measured,
            line,
            line_style: LineStyle::arrowheads(options.stroke_width),
            length,
            label,
            font_size_px: options.text_size,
        }
    }

    fn resolve_pair<T: DocumentTree + ?Sized>(
        &self,
        tree: &T,
        first: &SelectionEntry<T::Node>,
        second: &SelectionEntry<T::Node>,
    ) -> AnnotateResult<AnnotationSpec> {
        let start = center(tree, &first.node)?;
        let end = center(tree, &second.node)?;
        Ok(self.spec_for(&first.id, &second.id, Segment::new(start, end)))
    }

    /// Apply the ungeometric-element policy to a failed pair
    fn skip_or_abort<N>(
        &self,
        first: &SelectionEntry<N>,
        second: &SelectionEntry<N>,
        error: AnnotateError,
    ) -> AnnotateResult<SkippedPair> {
        let skippable = matches!(error, AnnotateError::UngeometricElement { .. })
            && self.options.on_ungeometric == UngeometricPolicy::SkipPair;
        if !skippable {
            return Err(error);
        }
        let reason = match &error {
            AnnotateError::UngeometricElement { source, .. } => format!("{error}: {source}"),
            _ => error.to_string(),
        };
        tracing::warn!(from = %first.id, to = %second.id, %reason, "skipping pair");
        Ok(SkippedPair {
            from_id: first.id.clone(),
            to_id: second.id.clone(),
            reason,
        })
    }

    /// Compute every annotation for the current selection without mutating
    pub fn plan<T: DocumentTree + ?Sized>(&self, tree: &T) -> AnnotateResult<AnnotationPlan> {
        let mut plan = AnnotationPlan::default();
        for (first, second) in sequence_entries(tree.selection())? {
            match self.resolve_pair(tree, &first, &second) {
                Ok(spec) => plan.specs.push(spec),
                Err(error) => plan.skipped.push(self.skip_or_abort(&first, &second, error)?),
            }
        }
        Ok(plan)
    }

    /// Annotate the current selection of `doc`
    pub fn annotate<D>(&self, doc: &mut D) -> AnnotateResult<AnnotationReport>
    where
        D: DocumentTree + DocumentMutator + ?Sized,
    {
        let pairs = sequence_entries(doc.selection())?;

        let report = match self.options.emission {
            EmissionMode::Incremental => self.annotate_incremental(doc, pairs)?,
            EmissionMode::Batched => self.annotate_batched(doc)?,
        };

        tracing::info!(
            pairs = report.annotated_pairs(),
            skipped = report.skipped.len(),
            marker_created = report.marker_created,
            "annotation run finished"
        );
        Ok(report)
    }

    fn annotate_incremental<D>(
        &self,
        doc: &mut D,
        pairs: Vec<(SelectionEntry<D::Node>, SelectionEntry<D::Node>)>,
    ) -> AnnotateResult<AnnotationReport>
    where
        D: DocumentTree + DocumentMutator + ?Sized,
    {
        let mut report = AnnotationReport {
            marker_created: ensure_arrowhead(doc)?,
            ..AnnotationReport::default()
        };

        for (first, second) in pairs {
            match self.resolve_pair(&*doc, &first, &second) {
                Ok(spec) => emit(doc, &spec, &mut report.emitted)?,
                Err(error) => report.skipped.push(self.skip_or_abort(&first, &second, error)?),
            }
        }
        Ok(report)
    }

    fn annotate_batched<D>(&self, doc: &mut D) -> AnnotateResult<AnnotationReport>
    where
        D: DocumentTree + DocumentMutator + ?Sized,
    {
        let plan = self.plan(&*doc)?;
        let mut report = AnnotationReport {
            marker_created: ensure_arrowhead(doc)?,
            skipped: plan.skipped,
            ..AnnotationReport::default()
        };
        for spec in &plan.specs {
            emit(doc, spec, &mut report.emitted)?;
        }
        Ok(report)
    }
}

fn emit<D: DocumentMutator + ?Sized>(
    doc: &mut D,
    spec: &AnnotationSpec,
    emitted: &mut Vec<CreationRequest>,
) -> AnnotateResult<()> {
    tracing::debug!(
        from = %spec.from_id,
        to = %spec.to_id,
        label = %spec.label.text,
        "appending annotation"
    );
    for request in spec.requests() {
        emitted.push(request.clone());
        doc.append_to_current_layer(request)?;
    }
    Ok(())
}
