//! Synthetic transaction batches for demos and tests.
//!
//! Ordinary daytime activity plus injected risk patterns: large amounts,
//! night operations, bursts of operations, structuring runs of small sums,
//! jumps between distant cities and unknown transaction types. A share of
//! clients is elderly so the escalation rule is exercised.

use crate::{geo::GeoPoint, rng::SeededRng, transaction::Transaction};
use chrono::{Duration, NaiveDate, NaiveDateTime};

struct City {
    name:     &'static str,
    location: GeoPoint,
}

const CITIES: [City; 8] = [
    City { name: "Moscow",           location: GeoPoint { latitude: 55.7558, longitude: 37.6173 } },
    City { name: "Saint Petersburg", location: GeoPoint { latitude: 59.9343, longitude: 30.3351 } },
    City { name: "Novosibirsk",      location: GeoPoint { latitude: 55.0084, longitude: 82.9357 } },
    City { name: "Yekaterinburg",    location: GeoPoint { latitude: 56.8389, longitude: 60.6057 } },
    City { name: "Kazan",            location: GeoPoint { latitude: 55.7961, longitude: 49.1064 } },
    City { name: "Vladivostok",      location: GeoPoint { latitude: 43.1155, longitude: 131.8855 } },
    City { name: "Sochi",            location: GeoPoint { latitude: 43.6028, longitude: 39.7342 } },
    City { name: "Kaliningrad",      location: GeoPoint { latitude: 54.7104, longitude: 20.4522 } },
];

const KNOWN_TYPES: [&str; 8] = [
    "Supermarkets",
    "Cafes and restaurants",
    "Transfers to individuals",
    "Utilities",
    "Electronics",
    "Cash withdrawal",
    "Online subscriptions",
    "Transport",
];

const UNKNOWN_TYPE_SAMPLES: [&str; 3] = ["Unknown", "Other", ""];

#[derive(Debug, Clone)]
pub struct SynthOptions {
    pub seed:    u64,
    pub clients: usize,
    /// First day of the generated activity.
    pub start:   NaiveDate,
    pub days:    i64,
}

/// Generate a batch. Same options ⇒ identical batch. Ids carry the seed,
/// so batches from different seeds never collide.
pub fn generate(options: &SynthOptions) -> Vec<Transaction> {
    let Some(origin) = options.start.and_hms_opt(0, 0, 0) else {
        return Vec::new();
    };

    let mut rows: Vec<Transaction> = (0..options.clients)
        .flat_map(|i| {
            let mut rng = SeededRng::fork(options.seed, i as u64);
            let client_id = format!("c-{}-{i:05}", options.seed);
            ClientScript::new(client_id, &mut rng, origin, options.days).play(&mut rng)
        })
        .collect();

    rows.sort_by(|a, b| a.date_time.cmp(&b.date_time).then_with(|| a.client_id.cmp(&b.client_id)));
    for (n, row) in rows.iter_mut().enumerate() {
        row.transaction_id = format!("t-{}-{n:07}", options.seed);
    }
    log::info!(
        "Generated {} synthetic transactions for {} clients (seed {})",
        rows.len(),
        options.clients,
        options.seed
    );
    rows
}

struct ClientScript {
    client_id:  String,
    birth_date: NaiveDate,
    home:       usize,
    origin:     NaiveDateTime,
    days:       i64,
    out:        Vec<Transaction>,
}

impl ClientScript {
    fn new(client_id: String, rng: &mut SeededRng, origin: NaiveDateTime, days: i64) -> Self {
        // ~30% of clients are 60+.
        let age_years = if rng.chance(0.30) {
            rng.range_i64(60, 90)
        } else {
            rng.range_i64(18, 59)
        };
        let birth_date = (origin - Duration::days(age_years * 365 + rng.range_i64(0, 364))).date();
        Self {
            client_id,
            birth_date,
            home: rng.next_u64_below(CITIES.len() as u64) as usize,
            origin,
            days: days.max(1),
            out: Vec::new(),
        }
    }

    fn play(mut self, rng: &mut SeededRng) -> Vec<Transaction> {
        let ordinary = rng.range_i64(5, 30);
        for _ in 0..ordinary {
            let at = self.daytime(rng);
            let amount = rng.pareto(300.0, 1.8).min(90_000.0);
            let t_type = if rng.chance(0.04) {
                rng.pick(&UNKNOWN_TYPE_SAMPLES).to_string()
            } else {
                rng.pick(&KNOWN_TYPES).to_string()
            };
            self.push(at, amount, Some(t_type), self.home);
        }

        if rng.chance(0.08) {
            let at = self.daytime(rng);
            let amount = rng.range_f64(100_001.0, 600_000.0);
            self.push(at, amount, Some("Transfers to individuals".into()), self.home);
        }
        if rng.chance(0.10) {
            let at = self.day_start(rng) + Duration::minutes(rng.range_i64(0, 5 * 60 + 59));
            let amount = rng.pareto(300.0, 1.8).min(50_000.0);
            self.push(at, amount, Some("Cash withdrawal".into()), self.home);
        }
        if rng.chance(0.06) {
            self.burst(rng);
        }
        if rng.chance(0.06) {
            self.structuring(rng);
        }
        if rng.chance(0.05) {
            self.city_jump(rng);
        }
        if rng.chance(0.03) {
            // Null t_type from the source system.
            let at = self.daytime(rng);
            self.push(at, rng.range_f64(100.0, 5_000.0), None, self.home);
        }

        self.out
    }

    fn day_start(&self, rng: &mut SeededRng) -> NaiveDateTime {
        self.origin + Duration::days(rng.range_i64(0, self.days - 1))
    }

    fn daytime(&self, rng: &mut SeededRng) -> NaiveDateTime {
        self.day_start(rng) + Duration::minutes(rng.range_i64(7 * 60, 23 * 60 + 59))
    }

    /// Nine or more operations inside ninety minutes.
    fn burst(&mut self, rng: &mut SeededRng) {
        let start = self.daytime(rng);
        for _ in 0..rng.range_i64(9, 14) {
            let at = start + Duration::minutes(rng.range_i64(0, 90));
            self.push(at, rng.range_f64(50.0, 3_000.0), Some("Online subscriptions".into()), self.home);
        }
    }

    /// Several sums just under the small-amount ceiling inside forty minutes.
    fn structuring(&mut self, rng: &mut SeededRng) {
        let start = self.daytime(rng);
        for _ in 0..rng.range_i64(3, 5) {
            let at = start + Duration::minutes(rng.range_i64(0, 40));
            self.push(at, rng.range_f64(7_000.0, 9_900.0), Some("Transfers to individuals".into()), self.home);
        }
    }

    /// Two operations from distant cities within half an hour.
    fn city_jump(&mut self, rng: &mut SeededRng) {
        let away = (self.home + 1 + rng.next_u64_below(CITIES.len() as u64 - 1) as usize) % CITIES.len();
        let at = self.daytime(rng);
        self.push(at, rng.range_f64(500.0, 20_000.0), Some("Supermarkets".into()), self.home);
        let later = at + Duration::minutes(rng.range_i64(5, 30));
        log::debug!(
            "client {} jumps {} -> {}",
            self.client_id,
            CITIES[self.home].name,
            CITIES[away].name
        );
        self.push(later, rng.range_f64(500.0, 20_000.0), Some("Electronics".into()), away);
    }

    fn push(&mut self, at: NaiveDateTime, amount: f64, t_type: Option<String>, city: usize) {
        let location = CITIES[city].location;
        self.out.push(Transaction {
            transaction_id:   String::new(),
            client_id:        self.client_id.clone(),
            date_time:        at,
            amount:           (amount * 100.0).round() / 100.0,
            t_type,
            birth_date:       self.birth_date,
            sender_latitude:  Some(location.latitude),
            sender_longitude: Some(location.longitude),
        });
    }
}
