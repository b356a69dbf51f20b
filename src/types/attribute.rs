use std::fmt;

use super::condition::Operator;

/// The shape of value an attribute accepts on the right of its operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueGrammar {
    /// Free text: quoted or bare, consumes the rest of the expression.
    Text,
    /// A git branch name (no `~ ^ : [ ] \` or spaces).
    Branch,
    /// A milestone title without whitespace.
    Milestone,
    /// A login, or an `@team` / `@org/team` reference.
    LoginOrTeam,
    /// A non-negative integer.
    Integer,
    /// `HH:MM` time of day in UTC.
    Time,
    /// No operator or value; presence means `= true`.
    Boolean,
}

impl ValueGrammar {
    /// Whether `op` may be used in front of a value of this grammar.
    #[must_use]
    pub fn accepts(self, op: Operator) -> bool {
        match self {
            ValueGrammar::Text
            | ValueGrammar::Branch
            | ValueGrammar::Milestone
            | ValueGrammar::LoginOrTeam => op.is_equality() || op == Operator::Regex,
            ValueGrammar::Integer => op != Operator::Regex,
            ValueGrammar::Time => op.is_range(),
            ValueGrammar::Boolean => false,
        }
    }
}

macro_rules! attributes {
    ($($variant:ident => $name:literal : $grammar:ident,)+) => {
        /// A named fact about a pull request that a condition can test.
        ///
        /// The catalog is closed: every legal attribute name is a variant here and
        /// is bound to exactly one [`ValueGrammar`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Attribute {
            $($variant,)+
        }

        impl Attribute {
            /// Every attribute, in catalog order.
            pub const ALL: &'static [Attribute] = &[$(Attribute::$variant,)+];

            /// The name used in expressions, e.g. `"merged-by"`.
            #[must_use]
            pub fn name(self) -> &'static str {
                match self {
                    $(Attribute::$variant => $name,)+
                }
            }

            /// The value grammar this attribute is bound to.
            #[must_use]
            pub fn grammar(self) -> ValueGrammar {
                match self {
                    $(Attribute::$variant => ValueGrammar::$grammar,)+
                }
            }

            /// Look an attribute up by its expression name.
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Attribute::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

attributes! {
    Head => "head": Branch,
    Base => "base": Branch,
    Author => "author": LoginOrTeam,
    MergedBy => "merged-by": LoginOrTeam,
    Body => "body": Text,
    Assignee => "assignee": LoginOrTeam,
    Label => "label": Text,
    Title => "title": Text,
    Files => "files": Text,
    Milestone => "milestone": Milestone,
    Number => "number": Integer,
    ReviewRequested => "review-requested": LoginOrTeam,
    ApprovedReviewsBy => "approved-reviews-by": LoginOrTeam,
    DismissedReviewsBy => "dismissed-reviews-by": LoginOrTeam,
    ChangesRequestedReviewsBy => "changes-requested-reviews-by": LoginOrTeam,
    CommentedReviewsBy => "commented-reviews-by": LoginOrTeam,
    StatusSuccess => "status-success": Text,
    StatusNeutral => "status-neutral": Text,
    StatusFailure => "status-failure": Text,
    CheckSuccess => "check-success": Text,
    CheckSuccessOrNeutral => "check-success-or-neutral": Text,
    CheckFailure => "check-failure": Text,
    CheckNeutral => "check-neutral": Text,
    CheckSkipped => "check-skipped": Text,
    CheckPending => "check-pending": Text,
    CheckStale => "check-stale": Text,
    CurrentTime => "current-time": Time,
    Locked => "locked": Boolean,
    Merged => "merged": Boolean,
    Closed => "closed": Boolean,
    Conflict => "conflict": Boolean,
    Draft => "draft": Boolean,
}

impl Attribute {
    /// Whether the `#` count prefix may be applied to this attribute.
    #[must_use]
    pub fn is_quantifiable(self) -> bool {
        !matches!(self.grammar(), ValueGrammar::Boolean | ValueGrammar::Time)
    }

    /// Whether a `-`/`¬`/`+` prefix may be applied to this attribute.
    #[must_use]
    pub fn accepts_prefix(self) -> bool {
        self.grammar() != ValueGrammar::Time
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
