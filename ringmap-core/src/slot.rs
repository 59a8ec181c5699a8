//! Slot rings and slot packing.
//!
//! Direct-strand slots stack outward from the backbone in slot order, reverse-strand slots
//! stack inward. Slots that never received a feature keep their number but take no ring space.
//! A feature only enters a slot when none of its visible ranges overlaps a visible range already
//! there.

use crate::canvas::Canvas;
use crate::context::{LayoutContext, SlotStack};
use crate::feature::{Feature, FeatureRange, SlotGeometry};
use crate::interval::CircularSpan;
use crate::label::Label;
use crate::text::TextMeasure;
use crate::types::Strand;

#[derive(Debug, Clone)]
pub struct FeatureSlot {
    strand: Strand,
    features: Vec<Feature>,
    /// Overrides the map-wide feature thickness.
    pub feature_thickness: Option<f64>,
    pub show_shading: bool,
    /// Overrides the map-wide minimum feature length.
    pub minimum_feature_length: Option<f64>,
}

impl FeatureSlot {
    pub fn new(strand: Strand) -> Self {
        Self {
            strand,
            features: Vec::new(),
            feature_thickness: None,
            show_shading: true,
            minimum_feature_length: None,
        }
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn thickness(&self, default: f64) -> f64 {
        self.feature_thickness.unwrap_or(default).max(0.0)
    }

    /// True when no visible range of `feature` overlaps a visible range already in the slot.
    pub fn is_room(&self, feature: &Feature) -> bool {
        let candidate: Vec<CircularSpan> =
            feature.ranges().iter().filter(|r| !r.is_hidden()).map(FeatureRange::span).collect();
        self.features
            .iter()
            .flat_map(Feature::ranges)
            .filter(|r| !r.is_hidden())
            .all(|r| {
                let placed = r.span();
                candidate.iter().all(|c| !placed.overlaps(c))
            })
    }

    /// Take ownership of `feature`; its strand becomes this slot's strand.
    pub fn add_feature(&mut self, mut feature: Feature) {
        feature.assign_strand(self.strand);
        self.features.push(feature);
    }

    /// Order by first base; direct-strand slots keep the reverse order.
    pub fn sort_features_by_start(&mut self) {
        self.features.sort_by_key(|f| f.start());
        if self.strand == Strand::Direct {
            self.features.reverse();
        }
    }

    pub fn draw(&self, ctx: &LayoutContext, geometry: &SlotGeometry, canvas: &mut dyn Canvas) {
        let geometry = SlotGeometry { show_shading: geometry.show_shading && self.show_shading, ..*geometry };
        for feature in &self.features {
            feature.draw(ctx, &geometry, canvas);
        }
    }

    pub fn label_candidates(&self, ctx: &mut LayoutContext, measure: &dyn TextMeasure) -> Vec<Label> {
        self.features
            .iter()
            .flat_map(|feature| feature.label_candidates(ctx, measure))
            .collect()
    }
}

/// Slot lists of both strands, in registration order.
#[derive(Debug, Clone, Default)]
pub struct SlotRegistry {
    direct: Vec<FeatureSlot>,
    reverse: Vec<FeatureSlot>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self, strand: Strand) -> &[FeatureSlot] {
        match strand {
            Strand::Direct => &self.direct,
            Strand::Reverse => &self.reverse,
        }
    }

    pub fn slots_mut(&mut self, strand: Strand) -> &mut Vec<FeatureSlot> {
        match strand {
            Strand::Direct => &mut self.direct,
            Strand::Reverse => &mut self.reverse,
        }
    }

    /// Make sure `strand` has at least `count` slots and return them.
    pub fn ensure(&mut self, strand: Strand, count: usize) -> &mut Vec<FeatureSlot> {
        let slots = self.slots_mut(strand);
        while slots.len() < count {
            slots.push(FeatureSlot::new(strand));
        }
        slots
    }

    /// Put `feature` in slot `requested` (0-based) of `strand`, or in the first later slot with
    /// room, creating slots as needed. Returns the index of the slot that took it.
    pub fn place(&mut self, strand: Strand, requested: usize, feature: Feature) -> usize {
        let slots = self.ensure(strand, requested + 1);
        let index = (requested..slots.len())
            .find(|&i| slots[i].is_room(&feature))
            .unwrap_or_else(|| {
                slots.push(FeatureSlot::new(strand));
                slots.len() - 1
            });
        if index != requested {
            log::debug!("Feature moved from {:?} slot {} to slot {}", strand, requested + 1, index + 1);
        }
        slots[index].add_feature(feature);
        index
    }

    /// Number of slots on both strands that hold at least one feature.
    pub fn slot_count(&self) -> usize {
        self.iter().count()
    }

    pub fn feature_count(&self) -> usize {
        self.iter().map(|(_, _, slot)| slot.len()).sum()
    }

    /// Occupied slots with their 0-based index, direct strand first.
    pub fn iter(&self) -> impl Iterator<Item = (Strand, usize, &FeatureSlot)> {
        let direct = self.direct.iter().enumerate().map(|(i, s)| (Strand::Direct, i, s));
        let reverse = self.reverse.iter().enumerate().map(|(i, s)| (Strand::Reverse, i, s));
        direct.chain(reverse).filter(|(_, _, s)| !s.is_empty())
    }

    pub fn sort_features_by_start(&mut self) {
        self.direct.iter_mut().chain(self.reverse.iter_mut()).for_each(FeatureSlot::sort_features_by_start);
    }

    /// Ring heights on each side of the backbone, each slot counting its thickness plus spacing.
    pub fn stack(&self, default_thickness: f64, spacing: f64) -> SlotStack {
        let height = |slots: &[FeatureSlot]| {
            slots.iter().filter(|s| !s.is_empty()).map(|s| s.thickness(default_thickness) + spacing).sum()
        };
        SlotStack { outer: height(&self.direct), inner: height(&self.reverse) }
    }

    /// Center radius of slot `index` on `strand`: the occupied slots before it are stacked from
    /// the first feature radius, then half of its own thickness is added.
    pub fn radius(&self, ctx: &LayoutContext, strand: Strand, index: usize, default_thickness: f64) -> f64 {
        let slots = self.slots(strand);
        let before: f64 = slots
            .iter()
            .take(index)
            .filter(|s| !s.is_empty())
            .map(|s| s.thickness(default_thickness) + ctx.slot_spacing)
            .sum();
        let own = slots.get(index).map_or(default_thickness, |s| s.thickness(default_thickness));
        match strand {
            Strand::Direct => ctx.first_outer_radius + before + 0.5 * own,
            Strand::Reverse => ctx.first_inner_radius - before - 0.5 * own,
        }
    }

    pub fn geometry(&self, ctx: &LayoutContext, strand: Strand, index: usize, default_thickness: f64) -> SlotGeometry {
        let slot = &self.slots(strand)[index];
        SlotGeometry {
            radius: self.radius(ctx, strand, index, default_thickness),
            thickness: slot.thickness(default_thickness),
            show_shading: true,
            minimum_feature_length: slot.minimum_feature_length.unwrap_or(ctx.minimum_feature_length),
        }
    }
}
