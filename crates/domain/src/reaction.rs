use serde::{Deserialize, Serialize};

use crate::models::{Comment, Review};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reaction {
    Like,
    Dislike,
}

impl Reaction {
    pub fn from_is_like(is_like: bool) -> Self {
        if is_like {
            Self::Like
        } else {
            Self::Dislike
        }
    }

    /// Path segment of the reaction endpoint.
    pub fn as_path(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
        }
    }
}

/// The four reaction fields carried by reviews and comments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reactions {
    pub likes: u32,
    pub dislikes: u32,
    pub liked_by_me: bool,
    pub disliked_by_me: bool,
}

impl Reactions {
    /// Toggle semantics: an active reaction is cleared, otherwise it is set
    /// and the opposite one (if active) is cleared in the same step.
    pub fn toggle(&mut self, reaction: Reaction) {
        let (count, active, other_count, other_active) = match reaction {
            Reaction::Like => (
                &mut self.likes,
                &mut self.liked_by_me,
                &mut self.dislikes,
                &mut self.disliked_by_me,
            ),
            Reaction::Dislike => (
                &mut self.dislikes,
                &mut self.disliked_by_me,
                &mut self.likes,
                &mut self.liked_by_me,
            ),
        };

        if *active {
            *active = false;
            *count = count.saturating_sub(1);
            return;
        }

        *active = true;
        *count = count.saturating_add(1);
        if *other_active {
            *other_active = false;
            *other_count = other_count.saturating_sub(1);
        }
    }
}

/// Anything that carries reaction fields.
pub trait Reactable {
    fn reactions(&self) -> &Reactions;
    fn reactions_mut(&mut self) -> &mut Reactions;
}

impl Reactable for Review {
    fn reactions(&self) -> &Reactions {
        &self.reactions
    }

    fn reactions_mut(&mut self) -> &mut Reactions {
        &mut self.reactions
    }
}

impl Reactable for Comment {
    fn reactions(&self) -> &Reactions {
        &self.reactions
    }

    fn reactions_mut(&mut self) -> &mut Reactions {
        &mut self.reactions
    }
}
