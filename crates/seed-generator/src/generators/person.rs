//! Person and place generators: names, emails, phones, addresses, cities.

use super::vocab::{
    CITIES, EMAIL_DOMAINS, GIVEN_NAMES, PROVINCES, STREET_NAMES, STREET_TYPES, SURNAMES,
};
use super::pick;
use rand::Rng;
use std::collections::HashSet;

/// Given name plus two surnames.
pub fn generate_name<R: Rng>(rng: &mut R) -> String {
    format!(
        "{} {} {}",
        pick(rng, GIVEN_NAMES),
        pick(rng, SURNAMES),
        pick(rng, SURNAMES)
    )
}

pub fn generate_city<R: Rng>(rng: &mut R) -> String {
    pick(rng, CITIES).to_string()
}

/// Spanish mobile or landline number, e.g. `+34 612 34 56 78`.
pub fn generate_phone<R: Rng>(rng: &mut R) -> String {
    let prefix = if rng.gen_bool(0.7) {
        rng.gen_range(600..=799)
    } else {
        rng.gen_range(910..=989)
    };
    format!(
        "+34 {prefix} {:02} {:02} {:02}",
        rng.gen_range(0..100),
        rng.gen_range(0..100),
        rng.gen_range(0..100)
    )
}

/// Street address with postal code, city and province.
pub fn generate_address<R: Rng>(rng: &mut R) -> String {
    format!(
        "{} {}, {}, {:05} {}, {}",
        pick(rng, STREET_TYPES),
        pick(rng, STREET_NAMES),
        rng.gen_range(1..=200),
        rng.gen_range(1000..=52999),
        pick(rng, CITIES),
        pick(rng, PROVINCES)
    )
}

/// Lower-case ASCII form of a word, for email local parts.
fn ascii_fold(word: &str) -> String {
    word.chars()
        .filter_map(|c| {
            let folded = match c {
                'á' | 'à' | 'Á' => 'a',
                'é' | 'É' => 'e',
                'í' | 'Í' => 'i',
                'ó' | 'Ó' => 'o',
                'ú' | 'ü' | 'Ú' => 'u',
                'ñ' | 'Ñ' => 'n',
                c if c.is_ascii_alphanumeric() => c.to_ascii_lowercase(),
                _ => return None,
            };
            Some(folded)
        })
        .collect()
}

/// Email addresses that never repeat within one generator.
#[derive(Debug, Default)]
pub struct EmailRegistry {
    issued: HashSet<String>,
}

impl EmailRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate an address not issued before. On a collision a numeric
    /// suffix is appended to the local part until the address is free.
    pub fn generate<R: Rng>(&mut self, rng: &mut R) -> String {
        let local = format!(
            "{}.{}",
            ascii_fold(pick(rng, GIVEN_NAMES)),
            ascii_fold(pick(rng, SURNAMES))
        );
        let domain = pick(rng, EMAIL_DOMAINS);

        let mut candidate = format!("{local}@{domain}");
        let mut suffix = rng.gen_range(1..100u32);
        while self.issued.contains(&candidate) {
            candidate = format!("{local}{suffix}@{domain}");
            suffix += 1;
        }
        self.issued.insert(candidate.clone());
        candidate
    }

    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_emails_are_unique() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut registry = EmailRegistry::new();

        // Far more addresses than distinct name/domain combinations.
        let emails: HashSet<String> = (0..5000).map(|_| registry.generate(&mut rng)).collect();

        assert_eq!(emails.len(), 5000);
        assert_eq!(registry.len(), 5000);
        assert!(emails.iter().all(|e| e.is_ascii() && e.contains('@')));
    }

    #[test]
    fn test_emails_fit_column() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut registry = EmailRegistry::new();
        for _ in 0..1000 {
            assert!(registry.generate(&mut rng).len() <= 100);
        }
    }

    #[test]
    fn test_phone_fits_column() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let phone = generate_phone(&mut rng);
            assert!(phone.starts_with("+34 "));
            assert!(phone.len() <= 20, "{phone}");
        }
    }

    #[test]
    fn test_address_fits_column() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            assert!(generate_address(&mut rng).chars().count() <= 150);
        }
    }

    #[test]
    fn test_ascii_fold() {
        assert_eq!(ascii_fold("Álvaro"), "alvaro");
        assert_eq!(ascii_fold("Muñoz"), "munoz");
    }
}
