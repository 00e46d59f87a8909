// This file is part of onlineboost, an online boosting classifier for
// adaptive visual tracking.
//
// The classifier follows the online AdaBoost scheme of Oza and Russell,
// as applied to tracking by Grabner and Bischof:
//
//      Real-Time Tracking via On-line Boosting,
//      Helmut Grabner, Michael Grabner, Horst Bischof.
//      In Proc. British Machine Vision Conference (BMVC), 2006.
//
// You can redistribute onlineboost and/or modify it under the terms of
// the BSD 2-Clause License.

use log::trace;

use crate::classifier::haar::splitmix64;
use crate::classifier::ClassifierSelector;
use crate::common::{Rectangle, Size};
use crate::feat::IntegralImage;

/// Keeps stage errors away from 0 and 1, where the log-odds weight and
/// the importance update degenerate.
const ERROR_EPSILON: f32 = 1e-4;

const DEFAULT_SEED: u64 = 0x6F6E_6C69_6E65_6221;

/// Online-boosted ensemble of [`ClassifierSelector`] stages.
///
/// Each stage holds its own pool of weak classifiers and a log-odds
/// weight `alpha` derived from the stage's running error estimate. One
/// instance is built per tracked target and updated on every labeled
/// sample the tracker produces, without ever retraining from scratch.
pub struct StrongClassifier {
    selectors: Vec<ClassifierSelector>,
    alpha: Vec<f32>,
    patch_size: Size,
    use_feature_replace: bool,
    err_mask: Vec<bool>,
    errors: Vec<f32>,
}

impl StrongClassifier {
    /// Build a classifier with `num_selectors` stages of
    /// `num_weak_classifiers` Haar-like classifiers each, without backup
    /// slots or feature replacement.
    pub fn new(num_selectors: usize, num_weak_classifiers: usize, patch_size: Size) -> Self {
        Self::build(num_selectors, num_weak_classifiers, 0, patch_size, false)
    }

    /// Build a classifier whose stages carry `num_backups` backup slots
    /// and evict their weakest classifier during training.
    pub fn with_feature_replace(
        num_selectors: usize,
        num_weak_classifiers: usize,
        num_backups: usize,
        patch_size: Size,
    ) -> Self {
        Self::build(num_selectors, num_weak_classifiers, num_backups, patch_size, true)
    }

    fn build(
        num_selectors: usize,
        num_weak_classifiers: usize,
        num_backups: usize,
        patch_size: Size,
        use_feature_replace: bool,
    ) -> Self {
        if num_selectors == 0 {
            panic!("Illegal classifier: at least one selector is required");
        }
        let mut state = DEFAULT_SEED;
        let selectors: Vec<ClassifierSelector> = (0..num_selectors)
            .map(|_| {
                ClassifierSelector::new(
                    num_weak_classifiers,
                    num_backups,
                    patch_size,
                    splitmix64(&mut state),
                )
            })
            .collect();
        Self::assemble(selectors, patch_size, use_feature_replace)
    }

    #[cfg(test)]
    fn from_selectors(
        selectors: Vec<ClassifierSelector>,
        patch_size: Size,
        use_feature_replace: bool,
    ) -> Self {
        Self::assemble(selectors, patch_size, use_feature_replace)
    }

    fn assemble(
        selectors: Vec<ClassifierSelector>,
        patch_size: Size,
        use_feature_replace: bool,
    ) -> Self {
        let pool_len = selectors
            .iter()
            .map(ClassifierSelector::pool_len)
            .max()
            .unwrap_or(0);
        let num_selectors = selectors.len();
        StrongClassifier {
            selectors,
            alpha: vec![0.0; num_selectors],
            patch_size,
            use_feature_replace,
            err_mask: vec![false; pool_len],
            errors: vec![0.0; pool_len],
        }
    }

    /// Confidence margin for a region: the alpha-weighted sum of the
    /// stage margins. Sign is the classification, magnitude the
    /// confidence. Read-only.
    pub fn evaluate(&self, image: &dyn IntegralImage, roi: Rectangle) -> f32 {
        self.selectors
            .iter()
            .zip(&self.alpha)
            .map(|(selector, alpha)| alpha * selector.evaluate(image, roi, None))
            .sum()
    }

    /// Hard decision for a region: `+1` when the margin is non-negative.
    pub fn classify(&self, image: &dyn IntegralImage, roi: Rectangle) -> i32 {
        if self.evaluate(image, roi) >= 0.0 {
            1
        } else {
            -1
        }
    }

    /// Score many candidate regions at once.
    ///
    /// Scoring is read-only, so the regions are evaluated in parallel.
    /// The boosting update is a different matter: stages depend on each
    /// other sequentially and are never parallelized.
    #[cfg(feature = "rayon")]
    pub fn evaluate_batch(&self, image: &dyn IntegralImage, rois: &[Rectangle]) -> Vec<f32> {
        use rayon::prelude::*;

        rois.par_iter()
            .map(|roi| self.evaluate(image, *roi))
            .collect()
    }

    /// Score many candidate regions at once.
    #[cfg(not(feature = "rayon"))]
    pub fn evaluate_batch(&self, image: &dyn IntegralImage, rois: &[Rectangle]) -> Vec<f32> {
        rois.iter().map(|roi| self.evaluate(image, *roi)).collect()
    }

    /// Learn from one labeled sample (`target` is `+1` for a matched
    /// region, `-1` for background) and report whether the updated
    /// ensemble classifies it correctly.
    ///
    /// This is the Oza-Russell online boosting protocol: the sample's
    /// importance weight threads through the stages in order, shrinking
    /// on stages that get the sample right and growing on stages that get
    /// it wrong, so later stages specialize on the hard samples. After a
    /// stage trains, it re-selects its best classifier (twice when
    /// feature replacement swapped a slot in between - the selection must
    /// reflect the swap before the stage error is read) and its alpha is
    /// recomputed from the clamped error estimate.
    pub fn update(
        &mut self,
        image: &dyn IntegralImage,
        roi: Rectangle,
        target: i32,
        importance: f32,
    ) -> bool {
        debug_assert!(
            target == 1 || target == -1,
            "target must be +1 or -1, got {}",
            target
        );

        let mut lambda = importance;
        for s in 0..self.selectors.len() {
            let selector = &mut self.selectors[s];
            selector.train(image, roi, target, lambda, &mut self.err_mask);
            selector.select_best_classifier(lambda, &self.err_mask, &mut self.errors);
            if self.use_feature_replace {
                selector.replace_weakest_classifier(&self.errors, self.patch_size);
                selector.select_best_classifier(lambda, &self.err_mask, &mut self.errors);
            }

            // a stage with no observations is uninformative, not perfect
            let error = if selector.observation_weight(None) == 0.0 {
                0.5
            } else {
                selector.error(None)
            };
            let error = error.clamp(ERROR_EPSILON, 1.0 - ERROR_EPSILON);
            self.alpha[s] = 0.5 * ((1.0 - error) / error).ln();

            let correct = selector.classify(image, roi) == target;
            lambda = if correct {
                lambda / (2.0 * (1.0 - error))
            } else {
                lambda / (2.0 * error)
            };
            trace!(
                "stage {}: error {:.4}, alpha {:.4}, importance out {:.4}",
                s,
                error,
                self.alpha[s],
                lambda
            );
        }

        let margin = self.evaluate(image, roi);
        let prediction = if margin >= 0.0 { 1 } else { -1 };
        prediction == target
    }

    /// Per-stage log-odds weights, in stage order.
    pub fn alpha(&self) -> &[f32] {
        &self.alpha
    }

    pub fn selectors(&self) -> &[ClassifierSelector] {
        &self.selectors
    }

    pub fn num_selectors(&self) -> usize {
        self.selectors.len()
    }

    pub fn patch_size(&self) -> Size {
        self.patch_size
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::classifier::testutil::{NullImage, XParityClassifier, YParityClassifier};
    use crate::classifier::WeakClassifierPool;
    use crate::feat::GrayIntegralImage;

    /// 48x24 frame: a high-contrast quadrant pattern on the left half, a
    /// flat gray block on the right half.
    fn test_frame() -> GrayIntegralImage {
        let (width, height) = (48usize, 24usize);
        let mut frame = vec![128u8; width * height];
        for y in 0..height {
            for x in 0..24 {
                frame[y * width + x] = if (x < 12) != (y < 12) { 255 } else { 0 };
            }
        }
        let mut integral = GrayIntegralImage::new();
        integral.compute(&frame, width as u32, height as u32);
        integral
    }

    fn pattern_roi() -> Rectangle {
        Rectangle::new(0, 0, 24, 24)
    }

    fn flat_roi() -> Rectangle {
        Rectangle::new(24, 0, 24, 24)
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let image = test_frame();
        let mut classifier = StrongClassifier::new(5, 8, Size::new(24, 24));
        for t in 0..6 {
            let (roi, target) = if t % 2 == 0 {
                (pattern_roi(), 1)
            } else {
                (flat_roi(), -1)
            };
            classifier.update(&image, roi, target, 1.0);
        }
        let first = classifier.evaluate(&image, pattern_roi());
        let second = classifier.evaluate(&image, pattern_roi());
        assert_eq!(first, second);
    }

    #[test]
    fn test_learns_to_separate_pattern_from_background() {
        let image = test_frame();
        let mut classifier = StrongClassifier::with_feature_replace(10, 12, 2, Size::new(24, 24));
        for t in 0..40 {
            let (roi, target) = if t % 2 == 0 {
                (pattern_roi(), 1)
            } else {
                (flat_roi(), -1)
            };
            classifier.update(&image, roi, target, 1.0);
        }

        let pattern = classifier.evaluate(&image, pattern_roi());
        let flat = classifier.evaluate(&image, flat_roi());
        assert!(pattern > flat);
        assert_eq!(1, classifier.classify(&image, pattern_roi()));
        assert_eq!(-1, classifier.classify(&image, flat_roi()));
        for selector in classifier.selectors() {
            assert!(selector.selected_classifier() < selector.num_weak_classifiers());
        }
    }

    #[test]
    fn test_batch_evaluation_matches_single_evaluation() {
        let image = test_frame();
        let mut classifier = StrongClassifier::new(4, 6, Size::new(24, 24));
        classifier.update(&image, pattern_roi(), 1, 1.0);
        classifier.update(&image, flat_roi(), -1, 1.0);

        let rois = [
            pattern_roi(),
            flat_roi(),
            Rectangle::new(6, 0, 24, 24),
            Rectangle::new(12, 0, 24, 24),
        ];
        let margins = classifier.evaluate_batch(&image, &rois);
        assert_eq!(rois.len(), margins.len());
        for (roi, margin) in rois.iter().zip(margins) {
            assert_eq!(classifier.evaluate(&image, *roi), margin);
        }
    }

    #[test]
    fn test_update_reports_correctness() {
        // one stage that is always right about x-parity samples
        let pool: WeakClassifierPool = vec![Box::new(XParityClassifier { agree: true })];
        let selectors = vec![ClassifierSelector::from_pool(1, 0, pool)];
        let mut classifier = StrongClassifier::from_selectors(selectors, Size::new(24, 24), false);

        assert!(classifier.update(&NullImage, Rectangle::new(0, 0, 4, 4), 1, 1.0));
        assert!(classifier.update(&NullImage, Rectangle::new(1, 0, 4, 4), -1, 1.0));
    }

    /// Two scripted stages: stage 0 is always correct, stage 1 depends on
    /// `roi.y`. The importance weight reaching stage 1 must be the one
    /// propagated through stage 0, not the caller's.
    #[test]
    fn test_importance_propagates_between_stages() {
        let stage0: WeakClassifierPool = vec![Box::new(XParityClassifier { agree: true })];
        let stage1: WeakClassifierPool = vec![Box::new(YParityClassifier { agree: true })];
        let selectors = vec![
            ClassifierSelector::from_pool(1, 0, stage0),
            ClassifierSelector::from_pool(1, 0, stage1),
        ];
        let mut classifier = StrongClassifier::from_selectors(selectors, Size::new(24, 24), false);

        // x parity matches the target (stage 0 correct), y parity does
        // not (stage 1 wrong)
        classifier.update(&NullImage, Rectangle::new(0, 1, 4, 4), 1, 1.0);

        // stage 0 was perfect: its error clamps to epsilon and the
        // importance passed on is roughly halved
        let propagated = self::expected_halved_importance();
        let stage1_weight = classifier.selectors()[1].observation_weight(None);
        assert!((stage1_weight - propagated).abs() < 1e-6);
        assert!(stage1_weight < 1.0);
        assert!(classifier.alpha()[0] > 0.0);
        // stage 1 got everything wrong so far
        assert!(classifier.alpha()[1] < 0.0);

        // keep going with samples stage 1 gets right; its error estimate
        // drops below one half and its alpha turns positive
        for t in 1..10 {
            let target = if t % 2 == 0 { 1 } else { -1 };
            classifier.update(&NullImage, Rectangle::new(t, t, 4, 4), target, 1.0);
        }
        assert!(classifier.alpha()[0] > 0.0);
        assert!(classifier.alpha()[1] > 0.0);
        assert!(classifier.selectors()[1].error(None) < 0.5);

        // every stage-1 increment was a propagated weight of about one
        // half, far below the ten units of raw importance fed in
        let total = classifier.selectors()[1].observation_weight(None);
        assert!(total < 6.0, "stage 1 accumulated {}", total);
    }

    fn expected_halved_importance() -> f32 {
        1.0 / (2.0 * (1.0 - 1e-4))
    }

    #[test]
    #[should_panic(expected = "Illegal classifier")]
    fn test_zero_selectors_panics() {
        StrongClassifier::new(0, 4, Size::new(24, 24));
    }
}
