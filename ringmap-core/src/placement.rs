//! Label placement driver.
//!
//! Runs once per side. Labels are trimmed to the label budget, spread sideways in angle,
//! pushed outward along their connectors where they still collide, and finally dropped when
//! nothing helped. Inner labels that cannot stay inside may restart on the outer ring, so the
//! inner side is always placed first.

use std::f64::consts::PI;

use crate::bounds::{BoundsKind, LabelBounds};
use crate::canvas::Canvas;
use crate::config::LabelQuality;
use crate::context::LayoutContext;
use crate::geometry::{Point, Rect};
use crate::label::{by_force, by_start_radians, split_at_label, Label, LabelSide};

const SPREAD_PADDING: f64 = 3.0;
const EXTEND_PADDING: f64 = 2.0;
const FINAL_PADDING: f64 = 1.5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlacementReport {
    /// Labels offered to the engine.
    pub total: usize,
    /// Labels that could not be shown.
    pub dropped: usize,
    /// Inner labels that were shown on the outer ring instead.
    pub moved_to_outer: usize,
}

impl PlacementReport {
    pub fn warning(&self) -> Option<String> {
        if self.dropped == 0 {
            None
        } else {
            Some(format!("Warning: {} of the {} labels are not shown.", self.dropped, self.total))
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlacedLabels {
    pub outer: Vec<Label>,
    pub inner: Vec<Label>,
    pub report: PlacementReport,
}

pub struct LabelPlacer<'a> {
    ctx: &'a LayoutContext,
    quality: LabelQuality,
    max_labels: usize,
    /// Legends that labels must keep clear of.
    blocked: Vec<Rect>,
}

impl<'a> LabelPlacer<'a> {
    pub fn new(ctx: &'a LayoutContext, quality: LabelQuality, max_labels: usize) -> Self {
        Self { ctx, quality, max_labels: max_labels.max(1), blocked: Vec::new() }
    }

    pub fn block(&mut self, area: Rect) {
        self.blocked.push(area);
    }

    pub fn place(&self, outer: Vec<Label>, inner: Vec<Label>) -> PlacedLabels {
        let mut report = PlacementReport { total: outer.len() + inner.len(), ..Default::default() };
        let mut moved = Vec::new();
        let inner = self.place_side(inner, LabelSide::Inner, &mut moved, &mut report);
        report.moved_to_outer = moved.len();

        let mut outer = outer;
        outer.extend(moved);
        let mut spill = Vec::new();
        let outer = self.place_side(outer, LabelSide::Outer, &mut spill, &mut report);

        log::debug!(
            "Placed {} outer and {} inner labels, {} moved outward, {} dropped",
            outer.len(),
            inner.len(),
            report.moved_to_outer,
            report.dropped
        );
        PlacedLabels { outer, inner, report }
    }

    /// Take a label out of play: inner labels move to the outer ring when allowed.
    fn discard(&self, label: Label, moved: &mut Vec<Label>, report: &mut PlacementReport) {
        if label.side() == LabelSide::Inner && self.ctx.move_inner_labels_to_outer {
            moved.push(label.moved_to_outer(self.ctx));
        } else {
            report.dropped += 1;
        }
    }

    fn place_side(
        &self,
        mut labels: Vec<Label>,
        side: LabelSide,
        moved: &mut Vec<Label>,
        report: &mut PlacementReport,
    ) -> Vec<Label> {
        let ctx = self.ctx;
        let start = match side {
            LabelSide::Outer => ctx.outer_label_start(),
            LabelSide::Inner => ctx.inner_label_start(),
        };
        for label in &mut labels {
            label.set_line_start_radius(ctx, start);
        }

        self.trim_to_budget(&mut labels, moved, report);

        labels.sort_by(by_start_radians);
        for label in &mut labels {
            label.update_bounds(ctx, SPREAD_PADDING);
        }
        self.spread(&mut labels);
        self.relax(&mut labels);
        for label in &mut labels {
            label.update_bounds(ctx, EXTEND_PADDING);
        }

        self.extend_or_drop(&mut labels, moved, report);
        for label in &mut labels {
            label.update_bounds(ctx, FINAL_PADDING);
        }

        self.remove_remaining_clashes(&mut labels, moved, report);
        self.remove_misfits(&mut labels, moved, report);
        self.remove_legend_overlaps(&mut labels, moved, report);

        labels.sort_by(by_force);
        for label in &mut labels {
            label.fixed_in_place = true;
        }
        labels
    }

    /// Drop non-forced labels over the budget, preferring those that clash with a later label.
    fn trim_to_budget(&self, labels: &mut Vec<Label>, moved: &mut Vec<Label>, report: &mut PlacementReport) {
        let mut j = 0;
        while labels.len() > self.max_labels && j < labels.len() {
            let clashes_later = !labels[j].force_label && labels[j + 1..].iter().any(|other| labels[j].clashes(other));
            if clashes_later {
                let label = labels.remove(j);
                self.discard(label, moved, report);
            } else {
                j += 1;
            }
        }
        let mut j = labels.len();
        while labels.len() > self.max_labels && j > 0 {
            j -= 1;
            if !labels[j].force_label {
                let label = labels.remove(j);
                self.discard(label, moved, report);
            }
        }
    }

    /// Push neighbouring labels apart in angle, pairwise around the circle.
    fn spread(&self, labels: &mut [Label]) {
        let n = labels.len();
        if n < 2 {
            return;
        }
        for _ in 0..self.quality.spread_iterations {
            let mut no_clash = true;
            for i in 0..n {
                if i == 0 && labels[1].line_start_radians() - labels[0].line_start_radians() > PI {
                    continue;
                }
                let (upper, lower) = if i == n - 1 {
                    // the last and first labels meet across the origin
                    if labels[i].line_start_radians() - labels[0].line_start_radians() < PI {
                        continue;
                    }
                    (i, 0)
                } else {
                    (i, i + 1)
                };
                if labels[upper].clashes(&labels[lower]) {
                    no_clash = false;
                    labels[upper].shift_radians_lower(self.ctx);
                    labels[lower].shift_radians_higher(self.ctx);
                }
            }
            if no_clash {
                break;
            }
        }
    }

    /// One step back toward the feature angle for every label that has room for it.
    fn relax(&self, labels: &mut [Label]) {
        for i in 0..labels.len() {
            if let Some((label, others)) = split_at_label(labels, i) {
                label.shift_radians_to_original(self.ctx, others);
            }
        }
    }

    /// Scan neighbours of each label; on a clash extend its radius and rescan, and drop it when
    /// the first extension fails.
    fn extend_or_drop(&self, labels: &mut Vec<Label>, moved: &mut Vec<Label>, report: &mut PlacementReport) {
        if labels.len() < 2 {
            return;
        }
        let mut span = self.quality.clash_span;
        let mut outer = 0;
        'labels: while outer < labels.len() {
            if labels[outer].force_label {
                outer += 1;
                continue;
            }
            let n = labels.len();
            span = span.min(n / 2);
            let mut j = outer as isize - span as isize;
            let mut checked = 0;
            while checked < span * 2 {
                if j >= n as isize {
                    j = 0;
                } else if j < 0 {
                    j += n as isize;
                }
                let other = j as usize;
                if other == outer {
                    j += 1;
                    continue;
                }
                if labels[outer].clashes(&labels[other]) {
                    if labels[outer].extend_radius(self.ctx) {
                        j = outer as isize - span as isize;
                        checked = 0;
                        continue;
                    }
                    let label = labels.remove(outer);
                    self.discard(label, moved, report);
                    continue 'labels;
                }
                checked += 1;
                j += 1;
            }
            outer += 1;
        }
    }

    fn remove_remaining_clashes(&self, labels: &mut Vec<Label>, moved: &mut Vec<Label>, report: &mut PlacementReport) {
        let mut i = 0;
        while i < labels.len() {
            let clashes_later = !labels[i].force_label && labels[i + 1..].iter().any(|other| labels[i].clashes(other));
            if clashes_later {
                let label = labels.remove(i);
                self.discard(label, moved, report);
            } else {
                i += 1;
            }
        }
    }

    fn fits(&self, label: &Label) -> bool {
        let ctx = self.ctx;
        let bounds = label.bounds();
        if !ctx.background.contains_rect(&bounds) || !ctx.background.contains_point(label.line_start(ctx)) {
            return false;
        }
        match label.side() {
            LabelSide::Outer => !rect_intersects_disc(&bounds, ctx.center, ctx.last_outer_radius),
            LabelSide::Inner if ctx.draw_entire_plasmid => {
                !ctx.title_rect.intersects(&bounds)
                    && !ctx.length_rect.intersects(&bounds)
                    && disc_contains_rect(ctx.center, ctx.last_inner_radius, &bounds)
            }
            LabelSide::Inner => true,
        }
    }

    fn remove_misfits(&self, labels: &mut Vec<Label>, moved: &mut Vec<Label>, report: &mut PlacementReport) {
        let mut i = 0;
        while i < labels.len() {
            if !labels[i].force_label && !self.fits(&labels[i]) {
                let label = labels.remove(i);
                self.discard(label, moved, report);
            } else {
                i += 1;
            }
        }
    }

    fn remove_legend_overlaps(&self, labels: &mut Vec<Label>, moved: &mut Vec<Label>, report: &mut PlacementReport) {
        if self.blocked.is_empty() {
            return;
        }
        let mut i = 0;
        while i < labels.len() {
            let bounds = labels[i].bounds();
            let covered = self.blocked.iter().any(|area| area.intersects(&bounds) || area.contains_rect(&bounds));
            if !labels[i].force_label && covered {
                let label = labels.remove(i);
                self.discard(label, moved, report);
            } else {
                i += 1;
            }
        }
    }
}

/// Draw connectors first, then text, inner side first. Returns a record for every label that
/// carries a hyperlink or mouseover.
pub fn draw_labels(ctx: &LayoutContext, canvas: &mut dyn Canvas, placed: &mut PlacedLabels) -> Vec<LabelBounds> {
    for label in placed.inner.iter().chain(placed.outer.iter()) {
        label.draw_line(ctx, canvas);
    }
    let mut records = Vec::new();
    for label in placed.inner.iter_mut().chain(placed.outer.iter_mut()) {
        let rect = label.draw_text(ctx, canvas);
        if label.hyperlink.is_some() || label.mouseover.is_some() {
            records.push(
                LabelBounds::new(BoundsKind::Feature, rect, label.text(), label.base)
                    .with_links(label.hyperlink.clone(), label.mouseover.clone()),
            );
        }
    }
    records
}

fn rect_intersects_disc(rect: &Rect, center: Point, radius: f64) -> bool {
    let nearest_x = center.x.clamp(rect.x, rect.max_x());
    let nearest_y = center.y.clamp(rect.y, rect.max_y());
    (nearest_x - center.x).hypot(nearest_y - center.y) < radius
}

fn disc_contains_rect(center: Point, radius: f64, rect: &Rect) -> bool {
    [(rect.x, rect.y), (rect.max_x(), rect.y), (rect.x, rect.max_y()), (rect.max_x(), rect.max_y())]
        .iter()
        .all(|&(x, y)| (x - center.x).hypot(y - center.y) <= radius)
}
