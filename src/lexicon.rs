use std::collections::HashSet;
use std::sync::OnceLock;

/// One curated mood word with its contrast pairing.
///
/// `descriptor` is a short English word describing the family of the term; it is
/// appended to outbound queries to steer the search toward visual work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexiconEntry {
    pub term: &'static str,
    pub antonym: Option<&'static str>,
    pub secondary_antonym: Option<&'static str>,
    pub descriptor: &'static str,
}

impl LexiconEntry {
    pub const fn new(
        term: &'static str,
        antonym: &'static str,
        secondary_antonym: Option<&'static str>,
        descriptor: &'static str,
    ) -> LexiconEntry {
        LexiconEntry {
            term,
            antonym: Some(antonym),
            secondary_antonym,
            descriptor,
        }
    }

    fn term_len(&self) -> usize {
        self.term.chars().count()
    }
}

static BUILTIN: OnceLock<Lexicon> = OnceLock::new();

const BUILTIN_ENTRIES: &[LexiconEntry] = &[
    // nature, space
    LexiconEntry::new("하늘", "땅", Some("아래"), "sky"),
    LexiconEntry::new("땅", "하늘", Some("위"), "ground"),
    LexiconEntry::new("바다", "사막", Some("산"), "sea"),
    LexiconEntry::new("산", "바다", Some("평야"), "mountain"),
    LexiconEntry::new("물", "불", Some("불꽃"), "water"),
    LexiconEntry::new("불", "물", Some("비"), "fire"),
    LexiconEntry::new("비", "해", Some("맑음"), "rain"),
    LexiconEntry::new("해", "비", Some("구름"), "sun"),
    LexiconEntry::new("흙", "물", Some("하늘"), "earth"),
    LexiconEntry::new("공기", "물", Some("땅"), "air"),

    // light, time
    LexiconEntry::new("빛", "어둠", Some("그림자"), "light"),
    LexiconEntry::new("어둠", "빛", Some("밝음"), "darkness"),
    LexiconEntry::new("밝다", "어둡다", Some("흐리다"), "bright"),
    LexiconEntry::new("어둡다", "밝다", Some("환하다"), "dark"),
    LexiconEntry::new("낮", "밤", Some("어둠"), "day"),
    LexiconEntry::new("밤", "낮", Some("아침"), "night"),
    LexiconEntry::new("새벽", "밤", Some("저녁"), "dawn"),
    LexiconEntry::new("저녁", "아침", Some("낮"), "evening"),
    LexiconEntry::new("오늘", "어제", Some("내일"), "today"),
    LexiconEntry::new("과거", "미래", Some("현재"), "past"),
    LexiconEntry::new("미래", "과거", Some("현재"), "future"),
    LexiconEntry::new("현재", "과거", Some("미래"), "present"),

    // feelings
    LexiconEntry::new("고요", "소란", Some("소음"), "calm"),
    LexiconEntry::new("소란", "고요", Some("침묵"), "noise"),
    LexiconEntry::new("차분", "격렬", Some("거칠음"), "calm"),
    LexiconEntry::new("격렬", "차분", Some("고요"), "intense"),
    LexiconEntry::new("행복", "불행", Some("고통"), "happiness"),
    LexiconEntry::new("불행", "행복", Some("기쁨"), "unhappiness"),
    LexiconEntry::new("기쁨", "슬픔", Some("고통"), "joy"),
    LexiconEntry::new("슬픔", "기쁨", Some("환희"), "sadness"),
    LexiconEntry::new("사랑", "미움", Some("증오"), "love"),
    LexiconEntry::new("미움", "사랑", Some("애정"), "hate"),
    LexiconEntry::new("고통", "기쁨", Some("행복"), "pain"),
    LexiconEntry::new("불안", "안정", Some("평온"), "anxiety"),
    LexiconEntry::new("안정", "불안", Some("변화"), "stability"),
    LexiconEntry::new("희망", "절망", Some("포기"), "hope"),
    LexiconEntry::new("절망", "희망", Some("기대"), "despair"),

    // life
    LexiconEntry::new("삶", "죽음", Some("사망"), "life"),
    LexiconEntry::new("죽음", "삶", Some("탄생"), "death"),
    LexiconEntry::new("태어나다", "죽다", Some("사라지다"), "birth"),
    LexiconEntry::new("살다", "죽다", Some("떠나다"), "live"),
    LexiconEntry::new("존재", "부재", Some("사라짐"), "existence"),
    LexiconEntry::new("존재하다", "사라지다", Some("없다"), "exist"),
    LexiconEntry::new("사라지다", "나타나다", Some("존재하다"), "vanish"),
    LexiconEntry::new("나타나다", "사라지다", Some("숨다"), "appear"),

    // size, distance
    LexiconEntry::new("크다", "작다", Some("작아지다"), "big"),
    LexiconEntry::new("작다", "크다", Some("넓다"), "small"),
    LexiconEntry::new("높다", "낮다", Some("짧다"), "high"),
    LexiconEntry::new("낮다", "높다", Some("길다"), "low"),
    LexiconEntry::new("멀다", "가깝다", Some("근처"), "far"),
    LexiconEntry::new("가깝다", "멀다", Some("떨어지다"), "close"),
    LexiconEntry::new("넓다", "좁다", Some("작다"), "wide"),
    LexiconEntry::new("좁다", "넓다", Some("크다"), "narrow"),
    LexiconEntry::new("단순하다", "복잡하다", Some("어렵다"), "simple"),
    LexiconEntry::new("복잡하다", "간단하다", Some("단순하다"), "complex"),

    // temperature, texture
    LexiconEntry::new("차갑다", "따뜻하다", Some("뜨겁다"), "cold"),
    LexiconEntry::new("따뜻하다", "차갑다", Some("춥다"), "warm"),
    LexiconEntry::new("춥다", "덥다", Some("따뜻하다"), "cold"),
    LexiconEntry::new("덥다", "춥다", Some("시원하다"), "hot"),
    LexiconEntry::new("부드럽다", "거칠다", Some("딱딱하다"), "soft"),
    LexiconEntry::new("거칠다", "부드럽다", Some("매끄럽다"), "rough"),
    LexiconEntry::new("뜨겁다", "차갑다", Some("미지근하다"), "hot"),
    LexiconEntry::new("마르다", "젖다", Some("축축하다"), "dry"),
    LexiconEntry::new("젖다", "마르다", Some("건조하다"), "wet"),

    // motion
    LexiconEntry::new("정지", "운동", Some("흐름"), "stillness"),
    LexiconEntry::new("운동", "정지", Some("휴식"), "movement"),
    LexiconEntry::new("흐르다", "멈추다", Some("괴다"), "flow"),
    LexiconEntry::new("멈추다", "움직이다", Some("계속하다"), "stop"),
    LexiconEntry::new("빠르다", "느리다", Some("천천히"), "fast"),
    LexiconEntry::new("느리다", "빠르다", Some("천천히"), "slow"),

    // order
    LexiconEntry::new("질서", "무질서", Some("혼란"), "order"),
    LexiconEntry::new("무질서", "질서", Some("정리"), "chaos"),
    LexiconEntry::new("균형", "불균형", None, "balance"),
    LexiconEntry::new("평화", "전쟁", Some("갈등"), "peace"),
    LexiconEntry::new("전쟁", "평화", Some("휴전"), "war"),
    LexiconEntry::new("갈등", "화해", Some("평화"), "conflict"),
    LexiconEntry::new("화해", "갈등", Some("싸움"), "reconcile"),

    // new, old
    LexiconEntry::new("새롭다", "낡다", Some("오래되다"), "new"),
    LexiconEntry::new("낡다", "새롭다", Some("새"), "old"),
    LexiconEntry::new("새", "헌", Some("오래된"), "new"),
    LexiconEntry::new("헌", "새", Some("새롭다"), "old"),

    // art, science
    LexiconEntry::new("예술", "과학", Some("기술"), "art"),
    LexiconEntry::new("과학", "예술", Some("종교"), "science"),
    LexiconEntry::new("자연", "인공", Some("문명"), "nature"),
    LexiconEntry::new("인공", "자연", None, "artificial"),

    // sound
    LexiconEntry::new("소리", "침묵", Some("무음"), "sound"),
    LexiconEntry::new("음악", "소음", Some("침묵"), "music"),
    LexiconEntry::new("소음", "음악", Some("침묵"), "noise"),
    LexiconEntry::new("침묵", "소리", Some("노래"), "silence"),

    // body
    LexiconEntry::new("눈물", "웃음", Some("기쁨"), "tears"),
    LexiconEntry::new("웃음", "눈물", Some("울음"), "laughter"),
    LexiconEntry::new("아프다", "건강하다", Some("괜찮다"), "painful"),
    LexiconEntry::new("건강하다", "아프다", Some("병들다"), "healthy"),

    // value
    LexiconEntry::new("의미", "무의미", None, "meaning"),
    LexiconEntry::new("무의미", "의미", None, "meaningless"),
    LexiconEntry::new("가치", "무가치", Some("비용"), "value"),
    LexiconEntry::new("무가치", "가치", None, "worthless"),

    // misc
    LexiconEntry::new("고향", "타향", Some("외국"), "hometown"),
    LexiconEntry::new("도시", "시골", Some("농촌"), "city"),
    LexiconEntry::new("시골", "도시", Some("산업"), "countryside"),
    LexiconEntry::new("자유", "구속", Some("속박"), "freedom"),
    LexiconEntry::new("구속", "자유", Some("해방"), "constraint"),
    LexiconEntry::new("희다", "검다", Some("까맣다"), "white"),
    LexiconEntry::new("검다", "희다", Some("하얗다"), "black"),
    LexiconEntry::new("붉다", "푸르다", Some("희다"), "red"),
    LexiconEntry::new("푸르다", "붉다", Some("노랗다"), "blue"),
];

/// Immutable term table, matched by plain substring containment.
#[derive(Debug, Clone)]
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
}

impl Lexicon {
    /// Entries must have a non-empty term; empty terms are dropped since they
    /// would match every input.
    pub fn new(entries: Vec<LexiconEntry>) -> Lexicon {
        let entries = entries
            .into_iter()
            .filter(|e| !e.term.is_empty())
            .collect();
        Lexicon { entries }
    }

    /// The shipped lexicon, built on first use.
    pub fn builtin() -> &'static Lexicon {
        BUILTIN.get_or_init(|| Lexicon::new(BUILTIN_ENTRIES.to_vec()))
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, term: &str) -> Option<&LexiconEntry> {
        self.entries.iter().find(|e| e.term == term)
    }

    /// Picks the most specific entry whose term occurs in `text`.
    ///
    /// Whitespace is removed before matching, so a term split by spaces still
    /// matches. The longest term wins; on equal length the entry declared first wins.
    pub fn match_term(&self, text: &str) -> Option<&LexiconEntry> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return None;
        }

        let mut picked: Option<&LexiconEntry> = None;
        for entry in &self.entries {
            if !normalized.contains(entry.term) {
                continue;
            }
            match picked {
                // strictly longer only, so earlier declarations keep ties
                Some(current) if entry.term_len() <= current.term_len() => {}
                _ => picked = Some(entry),
            }
        }
        picked
    }

    /// Antonyms that are not themselves terms of this lexicon.
    ///
    /// The shipped table has several of these (e.g. conjugated forms); callers use
    /// this for diagnostics only.
    pub fn dangling_antonyms(&self) -> Vec<&'static str> {
        let terms: HashSet<&str> = self.entries.iter().map(|e| e.term).collect();
        let mut seen = HashSet::new();
        let mut dangling = Vec::new();
        for entry in &self.entries {
            for antonym in [entry.antonym, entry.secondary_antonym].into_iter().flatten() {
                if !terms.contains(antonym) && seen.insert(antonym) {
                    dangling.push(antonym);
                }
            }
        }
        dangling
    }
}

/// Convenience wrapper over the builtin lexicon.
pub fn match_term(text: &str) -> Option<&'static LexiconEntry> {
    Lexicon::builtin().match_term(text)
}

fn normalize(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[test]
fn test_normalize_strips_all_whitespace() {
    assert_eq!(normalize("  하 늘\t이\n맑다 "), "하늘이맑다");
    assert_eq!(normalize("   "), "");
}

#[test]
fn test_builtin_terms_are_unique_and_non_empty() {
    let lexicon = Lexicon::builtin();
    let mut seen = HashSet::new();
    for entry in lexicon.entries() {
        assert!(!entry.term.is_empty());
        assert!(!entry.descriptor.is_empty());
        assert!(seen.insert(entry.term), "duplicate term {}", entry.term);
    }
    assert!(lexicon.len() > 100);
}
