//! Cyclomatic complexity of a single method.
//!
//! Cyclomatic complexity is calculated as:
//! - Start at 1
//! - Add 1 for each: if, ?:, for, for-each, while, do, catch, &&, ||
//! - Add 1 per switch arm (the switch itself adds nothing)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::{MethodDecl, NodeKind};

/// Reporting bucket for a complexity score. Thresholds are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplexityLabel {
    Low,
    Medium,
    High,
}

impl ComplexityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityLabel::Low => "Low",
            ComplexityLabel::Medium => "Medium",
            ComplexityLabel::High => "High",
        }
    }
}

impl fmt::Display for ComplexityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Low up to 5, Medium up to 10, High above.
pub fn label_for(score: u32) -> ComplexityLabel {
    match score {
        0..=5 => ComplexityLabel::Low,
        6..=10 => ComplexityLabel::Medium,
        _ => ComplexityLabel::High,
    }
}

/// Complexity of one method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexityScore {
    /// Always >= 1.
    pub score: u32,
    pub label: ComplexityLabel,
}

impl ComplexityScore {
    fn from_score(score: u32) -> Self {
        Self {
            score,
            label: label_for(score),
        }
    }
}

/// Paths added by a single node, not counting its children.
fn weight(kind: NodeKind) -> u32 {
    match kind {
        NodeKind::If
        | NodeKind::Conditional
        | NodeKind::Loop(_)
        | NodeKind::SwitchArm
        | NodeKind::Catch
        | NodeKind::Logical(_) => 1,
        NodeKind::Switch
        | NodeKind::Block
        | NodeKind::Try
        | NodeKind::Lambda
        | NodeKind::Other => 0,
    }
}

/// Score a method. A method without a body scores exactly 1.
pub fn score(method: &MethodDecl) -> ComplexityScore {
    let paths = method
        .body
        .as_ref()
        .map(|body| body.descendants().map(|n| weight(n.kind)).sum::<u32>())
        .unwrap_or(0);
    ComplexityScore::from_score(1 + paths)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::analysis::{JavaAnalyzer, LanguageAnalyzer};

    fn method_scores(source: &str) -> Vec<(String, u32)> {
        let unit = JavaAnalyzer::new()
            .parse(Path::new("T.java"), source.as_bytes())
            .unwrap();
        unit.declarations[0]
            .methods
            .iter()
            .map(|m| (m.name.clone(), score(m).score))
            .collect()
    }

    #[test]
    fn test_labels_follow_fixed_thresholds() {
        assert_eq!(label_for(1), ComplexityLabel::Low);
        assert_eq!(label_for(5), ComplexityLabel::Low);
        assert_eq!(label_for(6), ComplexityLabel::Medium);
        assert_eq!(label_for(10), ComplexityLabel::Medium);
        assert_eq!(label_for(11), ComplexityLabel::High);
    }

    #[test]
    fn test_abstract_method_scores_one() {
        let scores = method_scores("interface Repo { Order find(long id); }");
        assert_eq!(scores, vec![("find".to_string(), 1)]);
    }

    #[test]
    fn test_if_else_scores_two() {
        let scores = method_scores(
            r#"
class T {
    String sign(int x) {
        if (x > 0) {
            return "pos";
        } else {
            return "neg";
        }
    }
    void empty() {}
}
"#,
        );
        assert_eq!(
            scores,
            vec![("sign".to_string(), 2), ("empty".to_string(), 1)]
        );
    }

    #[test]
    fn test_switch_adds_one_per_arm() {
        let scores = method_scores(
            r#"
class T {
    int classic(int x) {
        switch (x) {
            case 1: return 10;
            case 2: return 20;
            default: return 0;
        }
    }
    int arrows(String s) {
        return switch (s) {
            case "a" -> 1;
            case "b" -> 2;
            case "c" -> 3;
            default -> 0;
        };
    }
}
"#,
        );
        assert_eq!(
            scores,
            vec![("classic".to_string(), 4), ("arrows".to_string(), 5)]
        );
    }

    #[test]
    fn test_loops_catch_ternary_and_logical() {
        let scores = method_scores(
            r#"
class T {
    int busy(int[] xs, boolean a, boolean b) {
        int total = 0;
        for (int i = 0; i < xs.length; i++) { total += xs[i]; }
        for (int x : xs) { total -= x; }
        while (total > 100) { total--; }
        do { total++; } while (total < 0);
        try {
            total = a && b || !a ? 1 : 2;
        } catch (IllegalStateException e) {
            total = 0;
        } catch (RuntimeException e) {
            total = -1;
        }
        return total;
    }
}
"#,
        );
        // 1 + for + foreach + while + do + && + || + ?: + 2 catch
        assert_eq!(scores, vec![("busy".to_string(), 10)]);
        assert_eq!(label_for(10), ComplexityLabel::Medium);
    }

    #[test]
    fn test_nested_lambda_bodies_are_counted() {
        let scores = method_scores(
            r#"
class T {
    void each(java.util.List<Integer> xs) {
        xs.forEach(x -> {
            if (x > 0) { System.out.println(x); }
        });
    }
}
"#,
        );
        assert_eq!(scores, vec![("each".to_string(), 2)]);
    }
}
