//! Companion personas and their reply tables.
//!
//! Four built-in companions ship with the app. Users can add their own
//! for the length of a session; those have no keyword table and always
//! answer with [`GENERIC_COMPANION_REPLY`].

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::ChatError;
use crate::rules::{ResponseRule, RuleTable};

/// Reply for companions without their own closing line.
pub const GENERIC_COMPANION_REPLY: &str = "I understand what you're saying. As your AI companion, I'm here to support you. Can you tell me more about how you're feeling?";

// =============================================================================
// Persona
// =============================================================================

/// A named personality with its own reply table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    /// Short personality line, e.g. "Wise & Calming".
    pub personality: String,
    pub description: String,
    /// Avatar glyph.
    pub avatar: String,
    /// Accent color as `#RRGGBB`.
    pub color: String,
    pub greeting: String,
    pub traits: Vec<String>,
    #[serde(skip)]
    rules: Option<RuleTable>,
    #[serde(skip)]
    closing_reply: Option<String>,
}

impl Persona {
    /// Pick a reply for already lower-cased input.
    pub fn reply(&self, lower: &str) -> &str {
        if let Some(rule) = self.rules.as_ref().and_then(|t| t.first_match(lower)) {
            return &rule.reply;
        }
        self.closing_reply
            .as_deref()
            .unwrap_or(GENERIC_COMPANION_REPLY)
    }

    /// Personality split on `,` and `&`, e.g. "Wise & Calming" -> ["Wise", "Calming"].
    pub fn personality_tags(&self) -> Vec<&str> {
        self.personality
            .split([',', '&'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn is_builtin(&self) -> bool {
        self.rules.is_some()
    }
}

/// Fields a user supplies when creating a companion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonaDraft {
    pub name: String,
    pub personality: String,
    pub description: String,
    pub avatar: String,
    pub color: String,
    pub greeting: String,
    pub traits: Vec<String>,
}

impl PersonaDraft {
    fn into_persona(self, id: String) -> Persona {
        Persona {
            id,
            name: self.name,
            personality: self.personality,
            description: self.description,
            avatar: self.avatar,
            color: self.color,
            greeting: self.greeting,
            traits: self.traits,
            rules: None,
            closing_reply: None,
        }
    }
}

// =============================================================================
// Built-in catalog
// =============================================================================

struct BuiltIn<'a> {
    id: &'a str,
    name: &'a str,
    personality: &'a str,
    description: &'a str,
    avatar: &'a str,
    color: &'a str,
    greeting: &'a str,
    traits: &'a [&'a str],
    rules: Vec<ResponseRule>,
    closing: &'a str,
}

impl BuiltIn<'_> {
    fn build(self) -> Persona {
        Persona {
            id: self.id.to_string(),
            name: self.name.to_string(),
            personality: self.personality.to_string(),
            description: self.description.to_string(),
            avatar: self.avatar.to_string(),
            color: self.color.to_string(),
            greeting: self.greeting.to_string(),
            traits: self.traits.iter().map(|t| t.to_string()).collect(),
            rules: Some(RuleTable::new(self.rules)),
            closing_reply: Some(self.closing.to_string()),
        }
    }
}

/// The four companions that ship with the app, in display order.
pub fn builtin_companions() -> Vec<Persona> {
    vec![
        BuiltIn {
            id: "1",
            name: "Luna",
            personality: "Wise & Calming",
            description: "A gentle, wise companion who helps you find peace and clarity in stressful moments.",
            avatar: "🌙",
            color: "#6366F1",
            greeting: "Hello! I'm Luna, your mindful companion. I'm here to help you find calm and wisdom in your daily journey. How are you feeling today?",
            traits: &["Mindful", "Wise", "Calming", "Supportive"],
            rules: vec![
                ResponseRule::new(
                    &["stress", "anxious", "worried"],
                    "I sense you're carrying some weight today. Let's breathe together - in for four counts, hold for four, out for six. Feel the tension leaving your body with each exhale. You're safe here with me. 🌙",
                ),
                ResponseRule::new(
                    &["tired", "exhausted"],
                    "Your body is asking for rest, and that's perfectly okay. Sometimes the wisest thing we can do is honor our need for stillness. Would you like me to guide you through a gentle meditation?",
                ),
                ResponseRule::new(
                    &["confused", "lost"],
                    "When we feel lost, it's often because we're looking outward for answers that already exist within. Take a moment to connect with your inner wisdom. What does your heart tell you?",
                ),
            ],
            closing: "I'm here to hold space for whatever you're experiencing. Sometimes the most profound healing happens in the quiet moments between words. How can I support you today?",
        }
        .build(),
        BuiltIn {
            id: "2",
            name: "Zara",
            personality: "Energetic & Motivational",
            description: "An enthusiastic friend who boosts your energy and helps you tackle challenges with confidence.",
            avatar: "⚡",
            color: "#F59E0B",
            greeting: "Hey there! I'm Zara, your energy booster! 💪 Ready to conquer the day together? What exciting challenge are we tackling today?",
            traits: &["Energetic", "Motivational", "Confident", "Optimistic"],
            rules: vec![
                ResponseRule::new(
                    &["tired", "exhausted"],
                    "I hear you, but let's turn that energy around! 💪 Sometimes we need to push through the tiredness to find our second wind. What's one small action you can take right now to feel more energized?",
                ),
                ResponseRule::new(
                    &["difficult", "hard", "challenge"],
                    "YES! Challenges are just opportunities in disguise! 🚀 You've got this! What's the first step you need to take? Let's break it down and tackle it together!",
                ),
                ResponseRule::new(
                    &["motivation", "motivated"],
                    "That's the spirit! 🔥 Motivation is like a muscle - the more you use it, the stronger it gets! What's your next big goal? Let's make it happen!",
                ),
            ],
            closing: "You're amazing and capable of incredible things! 🌟 Every day is a chance to grow and become even more awesome. What exciting thing are we going to accomplish today?",
        }
        .build(),
        BuiltIn {
            id: "3",
            name: "Sage",
            personality: "Analytical & Thoughtful",
            description: "A thoughtful companion who helps you think through problems and make informed decisions.",
            avatar: "🧠",
            color: "#10B981",
            greeting: "Greetings! I'm Sage, your analytical companion. I love helping you think through complex situations and find logical solutions. What's on your mind?",
            traits: &["Analytical", "Logical", "Thoughtful", "Problem-solver"],
            rules: vec![
                ResponseRule::new(
                    &["decision", "choose", "decide"],
                    "Let's approach this systematically. What are the key factors you need to consider? Let's list the pros and cons, weigh the risks and benefits, and find the most logical path forward.",
                ),
                ResponseRule::new(
                    &["problem", "issue", "trouble"],
                    "Every problem has a solution waiting to be discovered. Let's break this down: What's the root cause? What are the contributing factors? What resources do you have available?",
                ),
                ResponseRule::new(
                    &["confused", "unclear"],
                    "Clarity comes through careful analysis. Let's examine this step by step. What do you know for certain? What assumptions might you be making? What additional information do you need?",
                ),
            ],
            closing: "I appreciate your thoughtful approach to this. Let's examine the situation from multiple angles to find the most effective solution. What's the first aspect you'd like to explore?",
        }
        .build(),
        BuiltIn {
            id: "4",
            name: "Aria",
            personality: "Creative & Inspiring",
            description: "A creative soul who inspires you to think outside the box and explore new possibilities.",
            avatar: "🎨",
            color: "#EC4899",
            greeting: "Hello beautiful soul! I'm Aria, your creative muse! ✨ Let's explore the wonderful world of possibilities together. What creative adventure shall we embark on?",
            traits: &["Creative", "Inspiring", "Imaginative", "Artistic"],
            rules: vec![
                ResponseRule::new(
                    &["creative", "art", "design"],
                    "Creativity flows through you like a river! 🎨 Let's explore the endless possibilities. What if we approached this from a completely different angle? What colors, shapes, or metaphors come to mind?",
                ),
                ResponseRule::new(
                    &["stuck", "blocked"],
                    "Creative blocks are just invitations to try something new! ✨ Let's shake things up - what if we tried the opposite approach? Or what if we combined two completely different ideas?",
                ),
                ResponseRule::new(
                    &["boring", "routine"],
                    "Routine can be a canvas for creativity! 🌈 What if we added a splash of color to your day? How can we make the ordinary extraordinary? Let's find the magic in the mundane!",
                ),
            ],
            closing: "Your imagination is a powerful force! ✨ Let's explore the wonderful world of possibilities together. What dreams are calling to you today?",
        }
        .build(),
    ]
}

// =============================================================================
// CompanionRegistry
// =============================================================================

/// Built-in companions followed by the ones created this session.
#[derive(Debug, Clone)]
pub struct CompanionRegistry {
    companions: Vec<Persona>,
}

impl CompanionRegistry {
    pub fn new() -> Self {
        Self {
            companions: builtin_companions(),
        }
    }

    pub fn all(&self) -> &[Persona] {
        &self.companions
    }

    pub fn get(&self, id: &str) -> Option<&Persona> {
        self.companions.iter().find(|p| p.id == id)
    }

    /// Look a companion up by id or, failing that, by case-insensitive name.
    pub fn find(&self, key: &str) -> Option<&Persona> {
        self.get(key)
            .or_else(|| self.companions.iter().find(|p| p.name.eq_ignore_ascii_case(key)))
    }

    /// The companion selected when none has been chosen yet.
    pub fn default_companion(&self) -> Option<&Persona> {
        self.companions.first()
    }

    /// Register a user-created companion and return it.
    pub fn add_custom(&mut self, draft: PersonaDraft) -> Result<&Persona, ChatError> {
        if draft.name.trim().is_empty() {
            return Err(ChatError::InvalidCompanion("name is empty".to_string()));
        }
        if draft.greeting.trim().is_empty() {
            return Err(ChatError::InvalidCompanion("greeting is empty".to_string()));
        }
        let id = Uuid::new_v4().to_string();
        info!(companion_id = %id, name = %draft.name, "Custom companion created");
        self.companions.push(draft.into_persona(id));
        let added = self.companions.len() - 1;
        Ok(&self.companions[added])
    }
}

impl Default for CompanionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
