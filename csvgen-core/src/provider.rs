//! Fake-field provider: a per-run registry mapping field names to value
//! generators.
//!
//! Every field name resolves to a generator. Names with a built-in generator
//! (`email`, `phone`, `city`, ...) get that one; anything else falls back to a
//! random word. The binding is made on first lookup and then kept for the
//! lifetime of the registry, so a column keeps producing the same kind of
//! value for the whole run.

use std::collections::HashMap;
use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use tracing::trace;

/// A capability that produces a representative value for one field
pub trait ValueGenerator: Send {
    /// Produce a fresh value
    fn produce_value(&self, rng: &mut dyn RngCore) -> String;
}

impl<F> ValueGenerator for F
where
    F: Fn(&mut dyn RngCore) -> String + Send,
{
    fn produce_value(&self, rng: &mut dyn RngCore) -> String {
        self(rng)
    }
}

/// Registry of field-name-to-generator bindings for one pipeline run
pub struct FieldRegistry {
    /// Bound generators by field name
    generators: HashMap<String, Box<dyn ValueGenerator>>,

    /// Random source shared by all generators
    rng: StdRng,
}

impl FieldRegistry {
    /// Create a registry seeded from OS entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a registry with a fixed seed, for reproducible output
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Create a registry from an optional seed
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::seeded)
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            generators: HashMap::new(),
            rng,
        }
    }

    /// Bind a generator to a field name.
    ///
    /// Returns `false` and leaves the existing binding in place if the name
    /// is already bound.
    pub fn register(&mut self, name: &str, generator: Box<dyn ValueGenerator>) -> bool {
        if self.generators.contains_key(name) {
            return false;
        }
        self.generators.insert(name.to_string(), generator);
        true
    }

    /// Bind every name in `names` that is not bound yet
    pub fn register_all<'a>(&mut self, names: impl IntoIterator<Item = &'a String>) {
        for name in names {
            self.ensure_bound(name);
        }
    }

    /// Whether a generator is bound to this name
    pub fn is_bound(&self, name: &str) -> bool {
        self.generators.contains_key(name)
    }

    /// Number of bound names
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Whether nothing is bound yet
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Produce a value for the named field, binding a generator on first use
    pub fn value_for(&mut self, name: &str) -> String {
        self.ensure_bound(name);
        match self.generators.get(name) {
            Some(generator) => generator.produce_value(&mut self.rng),
            None => random_word(&mut self.rng),
        }
    }

    /// Flip an unbiased coin using the registry's random source
    pub fn coin_flip(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    fn ensure_bound(&mut self, name: &str) {
        if !self.generators.contains_key(name) {
            let generator = builtin_generator(name);
            trace!(field = name, "Binding field generator");
            self.generators.insert(name.to_string(), generator);
        }
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FieldRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.generators.keys().collect();
        names.sort();
        f.debug_struct("FieldRegistry").field("bound", &names).finish()
    }
}

/// Normalize a field name for built-in lookup: lower case, `-` and spaces
/// folded to `_`
fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Pick the generator for a field name, falling back to a random word
fn builtin_generator(name: &str) -> Box<dyn ValueGenerator> {
    match normalize(name).as_str() {
        "name" | "full_name" => Box::new(full_name),
        "first_name" => Box::new(|rng: &mut dyn RngCore| pick(rng, FIRST_NAMES).to_string()),
        "last_name" => Box::new(|rng: &mut dyn RngCore| pick(rng, LAST_NAMES).to_string()),
        "email" => Box::new(email),
        "phone" | "phone_number" => Box::new(phone),
        "address" => Box::new(address),
        "street" => Box::new(street),
        "city" => Box::new(|rng: &mut dyn RngCore| pick(rng, CITIES).to_string()),
        "country" => Box::new(|rng: &mut dyn RngCore| pick(rng, COUNTRIES).to_string()),
        "zip" | "zip_code" | "postcode" => Box::new(zip),
        "company" => Box::new(company),
        "username" => Box::new(username),
        "url" | "website" => Box::new(url),
        "uuid" => Box::new(|_: &mut dyn RngCore| uuid::Uuid::new_v4().to_string()),
        "sentence" => Box::new(sentence),
        "integer" | "number" => Box::new(|rng: &mut dyn RngCore| rng.gen_range(0..100_000).to_string()),
        "age" => Box::new(|rng: &mut dyn RngCore| rng.gen_range(18..90).to_string()),
        _ => Box::new(random_word),
    }
}

fn pick<'a>(rng: &mut dyn RngCore, values: &'a [&'a str]) -> &'a str {
    values.choose(rng).copied().unwrap_or_default()
}

fn random_word(rng: &mut dyn RngCore) -> String {
    pick(rng, WORDS).to_string()
}

fn full_name(rng: &mut dyn RngCore) -> String {
    format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES))
}

fn username(rng: &mut dyn RngCore) -> String {
    let first = pick(rng, FIRST_NAMES).to_ascii_lowercase();
    let last = pick(rng, LAST_NAMES).to_ascii_lowercase();
    format!("{first}.{last}{}", rng.gen_range(1..100))
}

fn email(rng: &mut dyn RngCore) -> String {
    format!("{}@{}", username(rng), pick(rng, EMAIL_DOMAINS))
}

fn phone(rng: &mut dyn RngCore) -> String {
    format!(
        "{:03}-{:03}-{:04}",
        rng.gen_range(200..1000),
        rng.gen_range(200..1000),
        rng.gen_range(0..10_000)
    )
}

fn street(rng: &mut dyn RngCore) -> String {
    format!("{} {}", pick(rng, LAST_NAMES), pick(rng, STREET_SUFFIXES))
}

fn zip(rng: &mut dyn RngCore) -> String {
    format!("{:05}", rng.gen_range(1000..100_000))
}

fn address(rng: &mut dyn RngCore) -> String {
    let number = rng.gen_range(1..10_000);
    let street_name = street(rng);
    let city = pick(rng, CITIES);
    let zip_code = zip(rng);
    format!("{number} {street_name} {city} {zip_code}")
}

fn company(rng: &mut dyn RngCore) -> String {
    format!("{} {}", pick(rng, LAST_NAMES), pick(rng, COMPANY_SUFFIXES))
}

fn url(rng: &mut dyn RngCore) -> String {
    format!("https://www.{}.{}", pick(rng, WORDS), pick(rng, TLDS))
}

fn sentence(rng: &mut dyn RngCore) -> String {
    let len = rng.gen_range(4..10);
    let mut text = (0..len).map(|_| pick(rng, WORDS)).collect::<Vec<_>>().join(" ");
    if let Some(first) = text.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    text.push('.');
    text
}

const FIRST_NAMES: &[&str] = &[
    "Ann", "Bruno", "Cid", "Dana", "Elena", "Farid", "Grace", "Hugo", "Ines", "Jonas",
    "Kira", "Liam", "Maya", "Noah", "Olga", "Pavel", "Quinn", "Rosa", "Sami", "Tara",
];

const LAST_NAMES: &[&str] = &[
    "Anderson", "Becker", "Costa", "Dubois", "Evans", "Fischer", "Garcia", "Hansen",
    "Ivanov", "Jensen", "Kowalski", "Larsen", "Moreau", "Novak", "Olsen", "Petrov",
];

const CITIES: &[&str] = &[
    "Springfield", "Riverton", "Lakeside", "Fairview", "Georgetown", "Ashland",
    "Clinton", "Madison", "Franklin", "Salem", "Bristol", "Oxford",
];

const COUNTRIES: &[&str] = &[
    "Argentina", "Brazil", "Canada", "Denmark", "Egypt", "France", "Germany", "India",
    "Japan", "Kenya", "Mexico", "Norway", "Portugal", "Spain", "Sweden",
];

const STREET_SUFFIXES: &[&str] = &["Street", "Avenue", "Road", "Lane", "Drive", "Court", "Way"];

const COMPANY_SUFFIXES: &[&str] = &["LLC", "Inc", "Group", "and Sons", "Ltd", "Partners"];

const EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "example.net", "mail.test"];

const TLDS: &[&str] = &["com", "org", "net", "io"];

const WORDS: &[&str] = &[
    "alias", "beatae", "commodi", "dolor", "eius", "fugiat", "harum", "illum", "iure",
    "laborum", "magni", "nobis", "omnis", "porro", "quia", "rerum", "saepe", "tempora",
    "ullam", "velit", "vero", "voluptas",
];
