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

use std::sync::Arc;

use log::{debug, trace};

use crate::classifier::haar::splitmix64;
use crate::classifier::{HaarClassifier, SharedClassifierPool, WeakClassifier, WeakClassifierPool};
use crate::common::{Rectangle, Size};
use crate::feat::IntegralImage;

/// Owned pools die with their selector; shared pools outlive every
/// selector holding a handle to them.
enum PoolHandle {
    Owned(WeakClassifierPool),
    Shared(SharedClassifierPool),
}

impl PoolHandle {
    fn with<R>(&self, f: impl FnOnce(&WeakClassifierPool) -> R) -> R {
        match self {
            PoolHandle::Owned(pool) => f(pool),
            PoolHandle::Shared(pool) => f(&pool.lock().expect("classifier pool mutex poisoned")),
        }
    }

    fn with_mut<R>(&mut self, f: impl FnOnce(&mut WeakClassifierPool) -> R) -> R {
        match self {
            PoolHandle::Owned(pool) => f(pool),
            PoolHandle::Shared(pool) => {
                f(&mut pool.lock().expect("classifier pool mutex poisoned"))
            }
        }
    }
}

/// Selects the best classifier out of a pool of weak classifiers.
///
/// The pool has two logical regions: active slots
/// `[0, num_weak_classifiers)`, from which the best-performing classifier
/// is selected, and backup slots after them, which train on every sample
/// like the active ones and stand by to replace an underperforming active
/// classifier. Per-slot importance-weighted correct/wrong accumulators
/// estimate each classifier's error rate.
pub struct ClassifierSelector {
    pool: PoolHandle,
    num_weak_classifiers: usize,
    num_backups: usize,
    selected_classifier: usize,
    next_backup: usize,
    w_correct: Vec<f32>,
    w_wrong: Vec<f32>,
}

impl ClassifierSelector {
    /// Build a selector that owns a pool of seeded [`HaarClassifier`]s.
    pub fn new(
        num_weak_classifiers: usize,
        num_backups: usize,
        patch_size: Size,
        seed: u64,
    ) -> Self {
        let mut state = seed;
        let pool: WeakClassifierPool = (0..num_weak_classifiers + num_backups)
            .map(|_| {
                Box::new(HaarClassifier::new(patch_size, splitmix64(&mut state)))
                    as Box<dyn WeakClassifier>
            })
            .collect();
        Self::from_pool(num_weak_classifiers, num_backups, pool)
    }

    /// Build a selector around a caller-supplied pool, taking ownership.
    pub fn from_pool(
        num_weak_classifiers: usize,
        num_backups: usize,
        pool: WeakClassifierPool,
    ) -> Self {
        Self::check_pool_size(num_weak_classifiers, num_backups, pool.len());
        Self::build(num_weak_classifiers, num_backups, PoolHandle::Owned(pool))
    }

    /// Build a selector over a pool shared with other selectors. The pool
    /// survives this selector; training calls serialize on its mutex.
    pub fn with_shared_pool(
        num_weak_classifiers: usize,
        num_backups: usize,
        pool: SharedClassifierPool,
    ) -> Self {
        let len = pool.lock().expect("classifier pool mutex poisoned").len();
        Self::check_pool_size(num_weak_classifiers, num_backups, len);
        Self::build(num_weak_classifiers, num_backups, PoolHandle::Shared(pool))
    }

    fn check_pool_size(num_weak_classifiers: usize, num_backups: usize, pool_len: usize) {
        if num_weak_classifiers == 0 {
            panic!("Illegal selector: at least one active weak classifier is required");
        }
        let expected = num_weak_classifiers + num_backups;
        if pool_len != expected {
            panic!("Illegal pool size: {} (expected {})", pool_len, expected);
        }
    }

    fn build(num_weak_classifiers: usize, num_backups: usize, pool: PoolHandle) -> Self {
        let pool_len = num_weak_classifiers + num_backups;
        ClassifierSelector {
            pool,
            num_weak_classifiers,
            num_backups,
            selected_classifier: 0,
            next_backup: num_weak_classifiers,
            w_correct: vec![0.0; pool_len],
            w_wrong: vec![0.0; pool_len],
        }
    }

    /// Train every classifier in the pool (active and backup alike) on
    /// one labeled sample, and advance the per-slot error statistics.
    ///
    /// `err_mask[i]` is set to whether slot `i` misclassified the sample.
    /// No selection decision is made here.
    pub fn train(
        &mut self,
        image: &dyn IntegralImage,
        roi: Rectangle,
        target: i32,
        importance: f32,
        err_mask: &mut [bool],
    ) {
        debug_assert!(
            target == 1 || target == -1,
            "target must be +1 or -1, got {}",
            target
        );
        assert_eq!(err_mask.len(), self.pool_len());

        let w_correct = &mut self.w_correct;
        let w_wrong = &mut self.w_wrong;
        self.pool.with_mut(|pool| {
            for (i, weak) in pool.iter_mut().enumerate() {
                let prediction = weak.classify(image, roi);
                err_mask[i] = prediction != target;
                weak.update(image, roi, target, importance);
                if prediction == target {
                    w_correct[i] += importance;
                } else {
                    w_wrong[i] += importance;
                }
            }
        });
    }

    /// Estimated error rate of a pool slot, or of the currently selected
    /// classifier when `index` is `None`. Always in `[0, 1]`; a slot that
    /// has seen no samples yet reports `0.0` (perfect so far).
    pub fn error(&self, index: Option<usize>) -> f32 {
        let index = index.unwrap_or(self.selected_classifier);
        self.check_index(index);
        self.slot_error(index)
    }

    /// Total importance weight accumulated by a pool slot (or the
    /// selected one). Zero means the error estimate is uninformative.
    pub fn observation_weight(&self, index: Option<usize>) -> f32 {
        let index = index.unwrap_or(self.selected_classifier);
        self.check_index(index);
        self.w_correct[index] + self.w_wrong[index]
    }

    fn slot_error(&self, index: usize) -> f32 {
        let total = self.w_correct[index] + self.w_wrong[index];
        if total > 0.0 {
            self.w_wrong[index] / total
        } else {
            0.0
        }
    }

    /// Recompute `errors` for the full pool and select the active slot
    /// with the lowest error. Ties resolve to the lowest index, so the
    /// selection is deterministic.
    ///
    /// `importance` and `err_mask` describe the sample that triggered the
    /// re-selection; they do not alter any statistics.
    pub fn select_best_classifier(
        &mut self,
        importance: f32,
        err_mask: &[bool],
        errors: &mut [f32],
    ) -> usize {
        assert_eq!(err_mask.len(), self.pool_len());
        assert_eq!(errors.len(), self.pool_len());

        for (i, error) in errors.iter_mut().enumerate() {
            *error = self.slot_error(i);
        }
        let mut best = 0;
        for i in 1..self.num_weak_classifiers {
            if errors[i] < errors[best] {
                best = i;
            }
        }
        trace!(
            "selected weak classifier {} (error {:.4}, sample importance {:.4}, missed by {} of {} slots)",
            best,
            errors[best],
            importance,
            err_mask.iter().filter(|missed| **missed).count(),
            err_mask.len()
        );
        self.selected_classifier = best;
        best
    }

    /// Evict the worst active classifier if the backup slot designated by
    /// the round-robin cursor currently outperforms it.
    ///
    /// On replacement the backup classifier moves into the active slot, a
    /// freshly drawn classifier takes over the vacated backup slot, both
    /// slots' statistics restart from zero and the cursor advances.
    /// Returns the replaced active index, or `None` if no backup is
    /// strictly better (or there are no backup slots).
    ///
    /// The selection is stale after a replacement; callers must re-run
    /// [`select_best_classifier`](Self::select_best_classifier).
    pub fn replace_weakest_classifier(
        &mut self,
        errors: &[f32],
        patch_size: Size,
    ) -> Option<usize> {
        if self.num_backups == 0 {
            return None;
        }
        assert_eq!(errors.len(), self.pool_len());

        let mut weakest = 0;
        for i in 1..self.num_weak_classifiers {
            if errors[i] > errors[weakest] {
                weakest = i;
            }
        }
        let backup = self.next_backup;
        if errors[backup] >= errors[weakest] {
            return None;
        }

        self.pool.with_mut(|pool| {
            pool.swap(weakest, backup);
            pool[backup].reset(patch_size);
        });
        self.reset_slot_statistics(weakest);
        self.reset_slot_statistics(backup);
        debug!(
            "replaced weak classifier {} (error {:.4}) with backup {} (error {:.4})",
            weakest, errors[weakest], backup, errors[backup]
        );
        self.advance_backup_cursor();
        Some(weakest)
    }

    /// Statistics-only variant of
    /// [`replace_weakest_classifier`](Self::replace_weakest_classifier)
    /// for shared pools, whose classifier objects this selector must not
    /// recreate: restarts both slots' statistics and advances the backup
    /// cursor without touching the pool.
    ///
    /// The caller guarantees `src` and `dst` form a valid pool index pair.
    pub fn replace_weakest_classifier_statistic(&mut self, src: usize, dst: usize) {
        self.check_index(src);
        self.check_index(dst);
        if self.num_backups == 0 {
            return;
        }
        self.reset_slot_statistics(src);
        self.reset_slot_statistics(dst);
        self.advance_backup_cursor();
    }

    fn reset_slot_statistics(&mut self, index: usize) {
        self.w_correct[index] = 0.0;
        self.w_wrong[index] = 0.0;
    }

    fn advance_backup_cursor(&mut self) {
        let offset = self.next_backup - self.num_weak_classifiers;
        self.next_backup = self.num_weak_classifiers + (offset + 1) % self.num_backups;
    }

    /// Hard decision of the currently selected classifier.
    pub fn classify(&self, image: &dyn IntegralImage, roi: Rectangle) -> i32 {
        let selected = self.selected_classifier;
        self.pool.with(|pool| pool[selected].classify(image, roi))
    }

    /// Confidence margin of a specific pool slot, or of the currently
    /// selected classifier when `index_weak` is `None`.
    pub fn evaluate(
        &self,
        image: &dyn IntegralImage,
        roi: Rectangle,
        index_weak: Option<usize>,
    ) -> f32 {
        let index = index_weak.unwrap_or(self.selected_classifier);
        self.check_index(index);
        self.pool.with(|pool| pool[index].evaluate(image, roi))
    }

    /// Handle to the shared pool, or `None` when the pool is owned.
    pub fn classifier_pool(&self) -> Option<SharedClassifierPool> {
        match &self.pool {
            PoolHandle::Shared(pool) => Some(Arc::clone(pool)),
            PoolHandle::Owned(_) => None,
        }
    }

    /// Swap in a shared pool of the same size. Statistics are kept: they
    /// are this selector's interpretation of the slots, not the pool's.
    pub fn set_classifier_pool(&mut self, pool: SharedClassifierPool) {
        let len = pool.lock().expect("classifier pool mutex poisoned").len();
        if len != self.pool_len() {
            panic!("Illegal pool size: {} (expected {})", len, self.pool_len());
        }
        self.pool = PoolHandle::Shared(pool);
    }

    pub fn selected_classifier(&self) -> usize {
        self.selected_classifier
    }

    /// Backup slot the next replacement will promote from. Meaningless
    /// when the selector has no backup slots.
    pub fn next_backup(&self) -> usize {
        self.next_backup
    }

    pub fn num_weak_classifiers(&self) -> usize {
        self.num_weak_classifiers
    }

    pub fn num_backups(&self) -> usize {
        self.num_backups
    }

    pub fn pool_len(&self) -> usize {
        self.num_weak_classifiers + self.num_backups
    }

    fn check_index(&self, index: usize) {
        assert!(
            index < self.pool_len(),
            "Illegal classifier index: {} (pool size {})",
            index,
            self.pool_len()
        );
    }
}
