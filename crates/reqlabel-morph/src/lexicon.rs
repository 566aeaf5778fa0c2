//! Built-in English lexicon used by the rule annotator.
//!
//! Closed-class words (determiners, pronouns, adpositions, conjunctions,
//! auxiliaries, particles, number words) carry a fixed tag and lemma. The
//! open-class lists only say which base forms are known adjectives, adverbs
//! and verbs; the annotator decides the exact tag from context.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use reqlabel_types::Pos;

/// Fixed analysis of a closed-class word.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LexEntry {
    pub pos: Pos,
    pub tag: &'static str,
    pub lemma: &'static str,
}

const CLOSED: &[(&str, Pos, &str, &str)] = &[
    // determiners
    ("the", Pos::Det, "DT", "the"),
    ("a", Pos::Det, "DT", "a"),
    ("an", Pos::Det, "DT", "an"),
    ("this", Pos::Det, "DT", "this"),
    ("that", Pos::Det, "DT", "that"),
    ("these", Pos::Det, "DT", "these"),
    ("those", Pos::Det, "DT", "those"),
    ("each", Pos::Det, "DT", "each"),
    ("every", Pos::Det, "DT", "every"),
    ("any", Pos::Det, "DT", "any"),
    ("some", Pos::Det, "DT", "some"),
    ("no", Pos::Det, "DT", "no"),
    ("all", Pos::Det, "DT", "all"),
    ("both", Pos::Det, "DT", "both"),
    ("either", Pos::Det, "DT", "either"),
    ("neither", Pos::Det, "DT", "neither"),
    ("another", Pos::Det, "DT", "another"),
    ("such", Pos::Adj, "JJ", "such"),
    ("half", Pos::Det, "PDT", "half"),
    ("several", Pos::Adj, "JJ", "several"),
    ("many", Pos::Adj, "JJ", "many"),
    ("few", Pos::Adj, "JJ", "few"),
    ("much", Pos::Adj, "JJ", "much"),
    ("various", Pos::Adj, "JJ", "various"),
    ("enough", Pos::Adj, "JJ", "enough"),
    // pronouns
    ("i", Pos::Pron, "PRP", "I"),
    ("me", Pos::Pron, "PRP", "I"),
    ("you", Pos::Pron, "PRP", "you"),
    ("he", Pos::Pron, "PRP", "he"),
    ("him", Pos::Pron, "PRP", "he"),
    ("she", Pos::Pron, "PRP", "she"),
    ("it", Pos::Pron, "PRP", "it"),
    ("we", Pos::Pron, "PRP", "we"),
    ("us", Pos::Pron, "PRP", "we"),
    ("they", Pos::Pron, "PRP", "they"),
    ("them", Pos::Pron, "PRP", "they"),
    ("itself", Pos::Pron, "PRP", "itself"),
    ("themselves", Pos::Pron, "PRP", "themselves"),
    ("my", Pos::Pron, "PRP$", "my"),
    ("your", Pos::Pron, "PRP$", "your"),
    ("his", Pos::Pron, "PRP$", "his"),
    ("her", Pos::Pron, "PRP$", "her"),
    ("its", Pos::Pron, "PRP$", "its"),
    ("our", Pos::Pron, "PRP$", "our"),
    ("their", Pos::Pron, "PRP$", "their"),
    ("who", Pos::Pron, "WP", "who"),
    ("whom", Pos::Pron, "WP", "whom"),
    ("what", Pos::Pron, "WP", "what"),
    ("whose", Pos::Det, "WP$", "whose"),
    ("which", Pos::Det, "WDT", "which"),
    ("whatever", Pos::Pron, "WDT", "whatever"),
    ("whichever", Pos::Det, "WDT", "whichever"),
    ("someone", Pos::Pron, "NN", "someone"),
    ("anyone", Pos::Pron, "NN", "anyone"),
    ("everyone", Pos::Pron, "NN", "everyone"),
    ("nobody", Pos::Pron, "NN", "nobody"),
    ("something", Pos::Pron, "NN", "something"),
    ("anything", Pos::Pron, "NN", "anything"),
    ("everything", Pos::Pron, "NN", "everything"),
    ("nothing", Pos::Pron, "NN", "nothing"),
    ("none", Pos::Pron, "NN", "none"),
    ("there", Pos::Pron, "EX", "there"),
    // modals
    ("shall", Pos::Aux, "MD", "shall"),
    ("should", Pos::Aux, "MD", "should"),
    ("must", Pos::Aux, "MD", "must"),
    ("may", Pos::Aux, "MD", "may"),
    ("might", Pos::Aux, "MD", "might"),
    ("can", Pos::Aux, "MD", "can"),
    ("ca", Pos::Aux, "MD", "can"),
    ("could", Pos::Aux, "MD", "could"),
    ("will", Pos::Aux, "MD", "will"),
    ("wo", Pos::Aux, "MD", "will"),
    ("would", Pos::Aux, "MD", "would"),
    ("'ll", Pos::Aux, "MD", "will"),
    ("'d", Pos::Aux, "MD", "would"),
    // auxiliaries
    ("be", Pos::Aux, "VB", "be"),
    ("am", Pos::Aux, "VBP", "be"),
    ("'m", Pos::Aux, "VBP", "be"),
    ("is", Pos::Aux, "VBZ", "be"),
    ("are", Pos::Aux, "VBP", "be"),
    ("'re", Pos::Aux, "VBP", "be"),
    ("was", Pos::Aux, "VBD", "be"),
    ("were", Pos::Aux, "VBD", "be"),
    ("been", Pos::Aux, "VBN", "be"),
    ("being", Pos::Aux, "VBG", "be"),
    ("have", Pos::Aux, "VBP", "have"),
    ("'ve", Pos::Aux, "VBP", "have"),
    ("has", Pos::Aux, "VBZ", "have"),
    ("had", Pos::Aux, "VBD", "have"),
    ("having", Pos::Aux, "VBG", "have"),
    ("do", Pos::Aux, "VBP", "do"),
    ("does", Pos::Aux, "VBZ", "do"),
    ("did", Pos::Aux, "VBD", "do"),
    // particles and negation
    ("not", Pos::Part, "RB", "not"),
    ("n't", Pos::Part, "RB", "not"),
    ("'s", Pos::Part, "POS", "'s"),
    // adpositions
    ("of", Pos::Adp, "IN", "of"),
    ("in", Pos::Adp, "IN", "in"),
    ("on", Pos::Adp, "IN", "on"),
    ("at", Pos::Adp, "IN", "at"),
    ("by", Pos::Adp, "IN", "by"),
    ("for", Pos::Adp, "IN", "for"),
    ("with", Pos::Adp, "IN", "with"),
    ("from", Pos::Adp, "IN", "from"),
    ("into", Pos::Adp, "IN", "into"),
    ("onto", Pos::Adp, "IN", "onto"),
    ("upon", Pos::Adp, "IN", "upon"),
    ("about", Pos::Adp, "IN", "about"),
    ("above", Pos::Adp, "IN", "above"),
    ("below", Pos::Adp, "IN", "below"),
    ("under", Pos::Adp, "IN", "under"),
    ("over", Pos::Adp, "IN", "over"),
    ("between", Pos::Adp, "IN", "between"),
    ("among", Pos::Adp, "IN", "among"),
    ("through", Pos::Adp, "IN", "through"),
    ("throughout", Pos::Adp, "IN", "throughout"),
    ("during", Pos::Adp, "IN", "during"),
    ("within", Pos::Adp, "IN", "within"),
    ("without", Pos::Adp, "IN", "without"),
    ("against", Pos::Adp, "IN", "against"),
    ("across", Pos::Adp, "IN", "across"),
    ("along", Pos::Adp, "IN", "along"),
    ("around", Pos::Adp, "IN", "around"),
    ("behind", Pos::Adp, "IN", "behind"),
    ("beyond", Pos::Adp, "IN", "beyond"),
    ("toward", Pos::Adp, "IN", "toward"),
    ("towards", Pos::Adp, "IN", "towards"),
    ("via", Pos::Adp, "IN", "via"),
    ("per", Pos::Adp, "IN", "per"),
    ("except", Pos::Adp, "IN", "except"),
    ("like", Pos::Adp, "IN", "like"),
    ("than", Pos::Adp, "IN", "than"),
    ("as", Pos::Adp, "IN", "as"),
    ("after", Pos::Adp, "IN", "after"),
    ("before", Pos::Adp, "IN", "before"),
    ("since", Pos::Sconj, "IN", "since"),
    ("until", Pos::Sconj, "IN", "until"),
    ("unless", Pos::Sconj, "IN", "unless"),
    ("if", Pos::Sconj, "IN", "if"),
    ("because", Pos::Sconj, "IN", "because"),
    ("although", Pos::Sconj, "IN", "although"),
    ("though", Pos::Sconj, "IN", "though"),
    ("whether", Pos::Sconj, "IN", "whether"),
    ("while", Pos::Sconj, "IN", "while"),
    ("whereas", Pos::Sconj, "IN", "whereas"),
    ("once", Pos::Sconj, "IN", "once"),
    ("when", Pos::Sconj, "WRB", "when"),
    ("where", Pos::Sconj, "WRB", "where"),
    ("how", Pos::Adv, "WRB", "how"),
    ("why", Pos::Adv, "WRB", "why"),
    // coordinators
    ("and", Pos::Cconj, "CC", "and"),
    ("or", Pos::Cconj, "CC", "or"),
    ("but", Pos::Cconj, "CC", "but"),
    ("nor", Pos::Cconj, "CC", "nor"),
    ("plus", Pos::Cconj, "CC", "plus"),
    // numbers
    ("zero", Pos::Num, "CD", "zero"),
    ("one", Pos::Num, "CD", "one"),
    ("two", Pos::Num, "CD", "two"),
    ("three", Pos::Num, "CD", "three"),
    ("four", Pos::Num, "CD", "four"),
    ("five", Pos::Num, "CD", "five"),
    ("six", Pos::Num, "CD", "six"),
    ("seven", Pos::Num, "CD", "seven"),
    ("eight", Pos::Num, "CD", "eight"),
    ("nine", Pos::Num, "CD", "nine"),
    ("ten", Pos::Num, "CD", "ten"),
    ("twelve", Pos::Num, "CD", "twelve"),
    ("twenty", Pos::Num, "CD", "twenty"),
    ("hundred", Pos::Num, "CD", "hundred"),
    ("thousand", Pos::Num, "CD", "thousand"),
    ("million", Pos::Num, "CD", "million"),
    // foreign / abbreviations
    ("etc", Pos::X, "FW", "etc"),
    ("vs", Pos::Adp, "IN", "vs"),
    ("please", Pos::Intj, "UH", "please"),
    ("yes", Pos::Intj, "UH", "yes"),
];

const ADJECTIVES: &[&str] = &[
    "able", "acceptable", "accurate", "adequate", "appropriate", "available", "bad", "basic",
    "big", "brief", "certain", "cheap", "clean", "clear", "close", "common", "complete",
    "complex", "consistent", "correct", "current", "deep", "default", "different", "difficult",
    "due", "early", "easy", "efficient", "empty", "entire", "exact", "external",
    "fair", "false", "far", "fast", "few", "fine", "first", "flexible", "free", "friendly",
    "full", "general", "good", "great", "hard", "heavy", "high", "important", "internal",
    "intuitive", "invalid", "large", "last", "late", "least", "little", "local", "long",
    "low", "main", "major", "many", "maximum", "minimum", "minor", "modern", "multiple",
    "necessary", "new", "next", "nice", "normal", "old", "open", "optimal", "other", "own",
    "particular", "poor", "possible", "previous", "primary", "private", "proper", "public",
    "quick", "ready", "real", "reasonable", "recent", "relevant", "reliable", "remote",
    "right", "robust", "safe", "same", "secure", "separate", "short", "similar",
    "simple", "slow", "small", "smart", "specific", "stable", "standard", "strong", "sufficient",
    "suitable", "sure", "true", "unique", "upper", "usable", "valid", "weak", "whole", "wide",
    "wrong", "young",
];

const ADVERBS: &[&str] = &[
    "again", "ahead", "almost", "already", "also", "always", "anyway", "approximately",
    "away", "back", "else", "even", "ever", "here", "however", "indeed", "instead", "just", "later",
    "maybe", "meanwhile", "moreover", "never", "now", "often", "once", "only", "otherwise",
    "perhaps", "quite", "rather", "sometimes", "somewhat", "soon", "still", "then", "there",
    "therefore", "thus", "together", "too", "very", "well", "yet",
];

const VERBS: &[&str] = &[
    "accept", "access", "add", "allow", "apply", "approve", "assign", "authenticate",
    "authorize", "backup", "become", "begin", "book", "bring", "build", "calculate", "call",
    "cancel", "change", "check", "choose", "close", "come", "comply", "compute", "configure",
    "confirm", "connect", "consider", "contain", "continue", "create", "deliver", "delete",
    "deploy", "describe", "detect", "determine", "disable", "display", "do", "download",
    "edit", "enable", "encrypt", "ensure", "enter", "exceed", "exist", "export", "fail",
    "fill", "filter", "find", "follow", "generate", "get", "give", "go", "handle", "have",
    "help", "hide", "import", "include", "indicate", "inform", "install", "integrate", "jump",
    "keep", "know", "launch", "let", "limit", "list", "load", "log", "login", "look",
    "maintain", "make", "manage", "mark", "meet", "modify", "monitor", "move", "need",
    "notify", "open", "operate", "order", "pay", "perform", "permit", "prevent", "print",
    "process", "produce", "protect", "provide", "publish", "query", "read", "receive",
    "record", "recover", "register", "reject", "remain", "remove", "report", "request",
    "require", "reset", "respond", "restart", "restore", "restrict", "retrieve", "return",
    "review", "run", "save", "scale", "schedule", "search", "see", "select", "send", "set",
    "share", "show", "sign", "sort", "specify", "start", "stop", "store", "submit",
    "support", "take", "track", "transfer", "update", "upgrade", "upload", "use", "validate",
    "verify", "view", "wait", "want", "work", "write",
];

static CLOSED_CLASS: LazyLock<HashMap<&'static str, LexEntry>> = LazyLock::new(|| {
    CLOSED
        .iter()
        .map(|&(word, pos, tag, lemma)| (word, LexEntry { pos, tag, lemma }))
        .collect()
});

static ADJECTIVE_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ADJECTIVES.iter().copied().collect());
static ADVERB_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ADVERBS.iter().copied().collect());
static VERB_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| VERBS.iter().copied().collect());

/// Fixed analysis of a lower-cased closed-class word. Curly apostrophes in
/// clitics must already be folded to `'`.
pub fn closed_class(lower: &str) -> Option<LexEntry> {
    CLOSED_CLASS.get(lower).copied()
}

pub fn is_adjective(lower: &str) -> bool {
    ADJECTIVE_SET.contains(lower)
}

pub fn is_adverb(lower: &str) -> bool {
    ADVERB_SET.contains(lower)
}

pub fn is_verb(lower: &str) -> bool {
    VERB_SET.contains(lower)
}

/// Whether the built-in lexicon knows `lemma` under `pos`.
///
/// Used as the existence check for lemmatization when no larger vocabulary
/// is available.
pub fn knows(pos: Pos, lemma: &str) -> bool {
    match pos {
        Pos::Adj => is_adjective(lemma),
        Pos::Adv => is_adverb(lemma),
        Pos::Verb | Pos::Aux => is_verb(lemma),
        _ => closed_class(lemma).is_some_and(|entry| entry.pos == pos),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_class_words_carry_tags() {
        let shall = closed_class("shall").expect("modal");
        assert_eq!((shall.pos, shall.tag), (Pos::Aux, "MD"));
        let were = closed_class("were").expect("aux");
        assert_eq!(were.lemma, "be");
        assert_eq!(closed_class("n't").map(|e| e.lemma), Some("not"));
        assert!(closed_class("system").is_none());
    }

    #[test]
    fn open_class_lists_are_consulted() {
        assert!(is_adjective("quick"));
        assert!(is_adverb("always"));
        assert!(is_verb("store"));
        assert!(knows(Pos::Verb, "display"));
        assert!(!knows(Pos::Noun, "display"));
    }
}
