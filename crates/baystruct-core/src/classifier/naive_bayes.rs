//! Naive Bayes spam classifier over word occurrence counts.
//!
//! Training data is the number of legitimate and spam emails seen plus, for
//! each flagged word, how often it appeared in each class. An email is a map
//! of word → occurrences. The class likelihood multiplies one smoothed factor
//! per occurrence of every known word:
//!
//! ```text
//! P(email | class) = Π_word (count[word][class] + mu / 3) / (count[word][legit] + count[word][spam] + mu) ^ occurrences
//! ```
//!
//! Words that never appeared in training contribute nothing. Posteriors are
//! normalised over the two classes in log space.

use std::collections::BTreeMap;
use std::fmt;

use crate::engine::errors::{BayesError, Result};
use crate::engine::estimator::{DEFAULT_MU, SMOOTHING_SUPPORT};

/// The two classes an email can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EmailClass {
    Legitimate,
    Spam,
}

impl EmailClass {
    /// Position of this class in a `[legit, spam]` count pair.
    pub fn index(self) -> usize {
        match self {
            EmailClass::Legitimate => 0,
            EmailClass::Spam => 1,
        }
    }
}

impl fmt::Display for EmailClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmailClass::Legitimate => f.write_str("Legitimate"),
            EmailClass::Spam => f.write_str("Spam"),
        }
    }
}

/// Per-word `[legit, spam]` counts plus class totals.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrainingCounts {
    legitimate_emails: f64,
    spam_emails: f64,
    words: BTreeMap<String, [f64; 2]>,
}

impl TrainingCounts {
    /// Creates counts for the given numbers of training emails per class.
    ///
    /// Both totals must be finite and non-negative, and their sum positive.
    pub fn new(legitimate_emails: f64, spam_emails: f64) -> Result<Self> {
        let valid = |v: f64| v.is_finite() && v >= 0.0;
        if !valid(legitimate_emails) || !valid(spam_emails) {
            return Err(BayesError::invalid(format!(
                "email totals must be finite and >= 0, got {} / {}",
                legitimate_emails, spam_emails
            )));
        }
        if legitimate_emails + spam_emails <= 0.0 {
            return Err(BayesError::invalid("no training emails"));
        }
        Ok(Self {
            legitimate_emails,
            spam_emails,
            words: BTreeMap::new(),
        })
    }

    /// Records how often `word` occurred in legitimate and spam emails.
    /// A repeated word replaces its earlier counts.
    pub fn insert_word(&mut self, word: impl Into<String>, legitimate: f64, spam: f64) -> Result<()> {
        let word = word.into();
        if !(legitimate.is_finite() && spam.is_finite() && legitimate >= 0.0 && spam >= 0.0) {
            return Err(BayesError::invalid(format!(
                "counts for '{}' must be finite and >= 0",
                word
            )));
        }
        self.words.insert(word, [legitimate, spam]);
        Ok(())
    }

    /// Builder form of [`TrainingCounts::insert_word`].
    pub fn with_word(mut self, word: impl Into<String>, legitimate: f64, spam: f64) -> Result<Self> {
        self.insert_word(word, legitimate, spam)?;
        Ok(self)
    }

    pub fn legitimate_emails(&self) -> f64 {
        self.legitimate_emails
    }

    pub fn spam_emails(&self) -> f64 {
        self.spam_emails
    }

    /// `[legit, spam]` counts for `word`, if it was seen in training.
    pub fn word(&self, word: &str) -> Option<[f64; 2]> {
        self.words.get(word).copied()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.words.len()
    }

    /// Prior probability of `class`.
    pub fn prior(&self, class: EmailClass) -> f64 {
        let total = self.legitimate_emails + self.spam_emails;
        match class {
            EmailClass::Legitimate => self.legitimate_emails / total,
            EmailClass::Spam => self.spam_emails / total,
        }
    }
}

/// Word → occurrence count for one email.
pub type EmailFeatures = BTreeMap<String, u32>;

/// Classification result for one email.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Verdict {
    /// Legitimate only when its posterior is strictly larger; spam otherwise,
    /// including an exact tie.
    pub class: EmailClass,
    /// Posterior of `class`.
    pub probability: f64,
    /// Posterior that the email is legitimate.
    pub legitimate: f64,
    /// Posterior that the email is spam.
    pub spam: f64,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} with probability {}", self.class, self.probability)
    }
}

/// Naive Bayes classifier over [`TrainingCounts`].
#[derive(Debug, Clone)]
pub struct NaiveBayes {
    counts: TrainingCounts,
    mu: f64,
}

impl NaiveBayes {
    /// Classifier with the default smoothing constant.
    pub fn new(counts: TrainingCounts) -> Self {
        Self {
            counts,
            mu: DEFAULT_MU,
        }
    }

    /// Overrides the smoothing constant; it must be finite and > 0.
    pub fn with_mu(mut self, mu: f64) -> Result<Self> {
        if !mu.is_finite() || mu <= 0.0 {
            return Err(BayesError::invalid(format!(
                "smoothing constant must be finite and > 0, got {}",
                mu
            )));
        }
        self.mu = mu;
        Ok(self)
    }

    pub fn counts(&self) -> &TrainingCounts {
        &self.counts
    }

    /// Smoothed probability of one occurrence of `word` given `class`, or
    /// `None` for words unseen in training.
    pub fn word_likelihood(&self, word: &str, class: EmailClass) -> Option<f64> {
        self.counts.word(word).map(|pair| {
            (pair[class.index()] + self.mu / SMOOTHING_SUPPORT) / (pair[0] + pair[1] + self.mu)
        })
    }

    /// `ln P(email | class)`.
    pub fn log_likelihood(&self, class: EmailClass, email: &EmailFeatures) -> f64 {
        email
            .iter()
            .filter_map(|(word, &n)| {
                self.word_likelihood(word, class)
                    .map(|p| f64::from(n) * p.ln())
            })
            .sum()
    }

    /// `P(email | class)` as a plain product. May underflow for long emails;
    /// [`NaiveBayes::classify`] works in log space instead.
    pub fn class_likelihood(&self, class: EmailClass, email: &EmailFeatures) -> f64 {
        self.log_likelihood(class, email).exp()
    }

    /// Posterior of each class and the winning class.
    pub fn classify(&self, email: &EmailFeatures) -> Result<Verdict> {
        let log_joint = |class: EmailClass| {
            self.counts.prior(class).ln() + self.log_likelihood(class, email)
        };
        let legit = log_joint(EmailClass::Legitimate);
        let spam = log_joint(EmailClass::Spam);

        // log-sum-exp over the two classes
        let max = legit.max(spam);
        if max == f64::NEG_INFINITY || max.is_nan() {
            return Err(BayesError::Numerical(
                "both class posteriors vanished".into(),
            ));
        }
        let norm = max + ((legit - max).exp() + (spam - max).exp()).ln();
        let p_legit = (legit - norm).exp();
        let p_spam = (spam - norm).exp();

        let (class, probability) = if p_legit > p_spam {
            (EmailClass::Legitimate, p_legit)
        } else {
            (EmailClass::Spam, p_spam)
        };

        Ok(Verdict {
            class,
            probability,
            legitimate: p_legit,
            spam: p_spam,
        })
    }
}

/// Builds [`EmailFeatures`] from `(word, occurrences)` pairs.
pub fn email<I, W>(words: I) -> EmailFeatures
where
    I: IntoIterator<Item = (W, u32)>,
    W: Into<String>,
{
    words.into_iter().map(|(w, n)| (w.into(), n)).collect()
}
