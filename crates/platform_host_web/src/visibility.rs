//! Per-root visibility memory for the pixelation observer.
//!
//! The intersection observer reports a container once, when it first crosses the threshold.
//! Images bound later under the same container would never hear about it, so the runtime
//! remembers which containers were seen and starts those images immediately.

/// Containers that have intersected the viewport at least once.
#[derive(Debug, Clone)]
pub struct SeenRoots<N> {
    roots: Vec<N>,
}

impl<N> Default for SeenRoots<N> {
    fn default() -> Self {
        Self { roots: Vec::new() }
    }
}

impl<N: PartialEq + Clone> SeenRoots<N> {
    /// Records `root` as visible. Returns `true` the first time it is seen.
    pub fn mark(&mut self, root: &N) -> bool {
        if self.contains(root) {
            return false;
        }
        self.roots.push(root.clone());
        true
    }

    /// Whether `root` has intersected before.
    pub fn contains(&self, root: &N) -> bool {
        self.roots.iter().any(|seen| seen == root)
    }

    /// Drops roots for which `keep` returns `false`, e.g. containers that left the page.
    pub fn retain(&mut self, keep: impl FnMut(&N) -> bool) {
        self.roots.retain(keep);
    }

    /// Whether an image bound now under `root` should start its reveal without waiting for the
    /// observer. Opted-out images never animate.
    pub fn starts_on_bind(&self, root: &N, opted_out: bool) -> bool {
        !opted_out && self.contains(root)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn images_bound_under_an_already_visible_root_start_at_once() {
        let mut seen = SeenRoots::default();
        assert!(!seen.starts_on_bind(&"desk", false));

        assert!(seen.mark(&"desk"));
        assert!(!seen.mark(&"desk"));

        assert!(seen.starts_on_bind(&"desk", false));
        assert!(!seen.starts_on_bind(&"desk", true));
        assert!(!seen.starts_on_bind(&"projects", false));
    }

    #[test]
    fn removed_roots_are_forgotten() {
        let mut seen = SeenRoots::default();
        seen.mark(&"desk");
        seen.mark(&"projects");

        seen.retain(|root| *root != "desk");

        assert_eq!(seen.contains(&"desk"), false);
        assert!(seen.contains(&"projects"));
    }
}
