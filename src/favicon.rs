/// Favicon decoration: rule selection, composition and a deduplicating cache
///
/// Composition happens in Rust on a 32px RGBA canvas and is handed to the
/// browser as a PNG data URL.
use crate::error::{Result, ToolkitError};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{LocalBoxFuture, Shared};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::io::Cursor;
use std::rc::Rc;

pub const ICON_SIZE: u32 = 32;
pub const DEFAULT_COLOR: &str = "#5f6368";
pub const MAX_CONCURRENT_COMPOSITIONS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FaviconEffect {
    /// The instance's own logo
    InstanceLogo,
    /// Stock logo on a filled background
    TintedLogo,
    StripeTop,
    StripeRight,
    StripeBottom,
    StripeLeft,
}

impl FaviconEffect {
    pub fn is_stripe(&self) -> bool {
        matches!(
            self,
            FaviconEffect::StripeTop | FaviconEffect::StripeRight | FaviconEffect::StripeBottom | FaviconEffect::StripeLeft
        )
    }
}

/// User-configured decoration; `pattern` is a regex tested against the instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaviconRule {
    pub pattern: String,
    pub effect: FaviconEffect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl FaviconRule {
    pub fn new(pattern: &str, effect: FaviconEffect, color: Option<&str>) -> Self {
        FaviconRule {
            pattern: pattern.to_string(),
            effect,
            color: color.map(str::to_string),
        }
    }
}

/// What to draw for an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoration {
    pub effect: FaviconEffect,
    pub color: Rgba<u8>,
}

impl Decoration {
    pub fn fallback() -> Self {
        Decoration {
            effect: FaviconEffect::TintedLogo,
            color: neutral(),
        }
    }

    pub fn cache_key(&self, instance: &str) -> CacheKey {
        CacheKey {
            instance: instance.to_string(),
            effect: self.effect,
            color: to_hex(self.color),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub instance: String,
    pub effect: FaviconEffect,
    pub color: String,
}

/// `#rgb`, `#rrggbb` or `#rrggbbaa`
pub fn parse_color(text: &str) -> Result<Rgba<u8>> {
    let invalid = || ToolkitError::Favicon(format!("invalid color '{}'", text));
    let hex = text.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |i: usize, width: usize| u8::from_str_radix(&hex[i * width..(i + 1) * width], 16).map_err(|_| invalid());
    match hex.len() {
        3 => {
            let short = |i: usize| channel(i, 1).map(|v| v * 17);
            Ok(Rgba([short(0)?, short(1)?, short(2)?, 255]))
        }
        6 => Ok(Rgba([channel(0, 2)?, channel(1, 2)?, channel(2, 2)?, 255])),
        8 => Ok(Rgba([channel(0, 2)?, channel(1, 2)?, channel(2, 2)?, channel(3, 2)?])),
        _ => Err(invalid()),
    }
}

fn to_hex(color: Rgba<u8>) -> String {
    let [r, g, b, a] = color.0;
    if a == 255 {
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    } else {
        format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
    }
}

fn neutral() -> Rgba<u8> {
    Rgba([0x5f, 0x63, 0x68, 255])
}

/// Compiled rule list; rules with a bad pattern or color are skipped
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<(Regex, Decoration)>,
}

impl RuleSet {
    pub fn compile(rules: &[FaviconRule]) -> Self {
        let compiled = rules
            .iter()
            .filter_map(|rule| {
                let pattern = Regex::new(&rule.pattern)
                    .map_err(|err| warn!("skipping favicon rule '{}': {}", rule.pattern, err))
                    .ok()?;
                let color = match &rule.color {
                    Some(color) => parse_color(color)
                        .map_err(|err| warn!("skipping favicon rule '{}': {}", rule.pattern, err))
                        .ok()?,
                    None => neutral(),
                };
                Some((pattern, Decoration { effect: rule.effect, color }))
            })
            .collect();
        RuleSet { rules: compiled }
    }

    /// First matching rule, else the neutral tinted logo
    pub fn select(&self, instance: &str) -> Decoration {
        self.rules
            .iter()
            .find(|(pattern, _)| pattern.is_match(instance))
            .map(|(_, decoration)| *decoration)
            .unwrap_or_else(Decoration::fallback)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Stock platform mark: three rising bars over a filled square
pub fn tinted_logo(color: Rgba<u8>) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(ICON_SIZE, ICON_SIZE, color);
    let white = Rgba([255, 255, 255, 255]);
    let baseline = ICON_SIZE - 6;
    for (x, height) in [(7, 8), (14, 13), (21, 18)] {
        fill_rect(&mut canvas, x, baseline - height, 5, height, white);
    }
    canvas
}

/// Overlay a quarter-canvas band on the side named by `effect`
pub fn overlay_stripe(base: &RgbaImage, effect: FaviconEffect, color: Rgba<u8>) -> RgbaImage {
    let mut canvas = imageops::resize(base, ICON_SIZE, ICON_SIZE, FilterType::Triangle);
    let band = ICON_SIZE / 4;
    let far = ICON_SIZE - band;
    let (x, y, width, height) = match effect {
        FaviconEffect::StripeTop => (0, 0, ICON_SIZE, band),
        FaviconEffect::StripeBottom => (0, far, ICON_SIZE, band),
        FaviconEffect::StripeRight => (far, 0, band, ICON_SIZE),
        FaviconEffect::StripeLeft => (0, 0, band, ICON_SIZE),
        FaviconEffect::InstanceLogo | FaviconEffect::TintedLogo => return canvas,
    };
    fill_rect(&mut canvas, x, y, width, height, color);
    canvas
}

fn fill_rect(canvas: &mut RgbaImage, x: u32, y: u32, width: u32, height: u32, color: Rgba<u8>) {
    for py in y..(y + height).min(canvas.height()) {
        for px in x..(x + width).min(canvas.width()) {
            canvas.put_pixel(px, py, color);
        }
    }
}

fn decode_icon(bytes: &[u8]) -> Result<RgbaImage> {
    let image = image::load_from_memory(bytes).map_err(|err| ToolkitError::Favicon(err.to_string()))?;
    Ok(imageops::resize(&image.to_rgba8(), ICON_SIZE, ICON_SIZE, FilterType::Triangle))
}

/// Draw a decoration; `source` is the instance logo or the page's own favicon
pub fn render(decoration: &Decoration, source: Option<&[u8]>) -> Result<RgbaImage> {
    let decoded = source.map(decode_icon).transpose().unwrap_or_else(|err| {
        warn!("favicon source unusable: {}", err);
        None
    });

    let image = match decoration.effect {
        FaviconEffect::TintedLogo => tinted_logo(decoration.color),
        FaviconEffect::InstanceLogo => decoded.unwrap_or_else(|| {
            debug!("no instance logo, drawing tinted logo");
            tinted_logo(decoration.color)
        }),
        effect => {
            let base = decoded.unwrap_or_else(|| tinted_logo(neutral()));
            overlay_stripe(&base, effect, decoration.color)
        }
    };
    Ok(image)
}

pub fn to_data_url(image: &RgbaImage) -> Result<String> {
    let mut png = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image.clone())
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|err| ToolkitError::Favicon(err.to_string()))?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png.into_inner())))
}

/// Bounded concurrency for composition work
pub struct WorkQueue {
    limit: usize,
    active: Cell<usize>,
    waiting: RefCell<VecDeque<oneshot::Sender<()>>>,
}

struct Permit {
    queue: Rc<WorkQueue>,
}

impl Drop for Permit {
    fn drop(&mut self) {
        self.queue.release();
    }
}

impl WorkQueue {
    pub fn new(limit: usize) -> Rc<Self> {
        Rc::new(WorkQueue {
            limit: limit.max(1),
            active: Cell::new(0),
            waiting: RefCell::new(VecDeque::new()),
        })
    }

    pub fn active(&self) -> usize {
        self.active.get()
    }

    pub fn waiting(&self) -> usize {
        self.waiting.borrow().len()
    }

    pub async fn run<F: Future>(self: Rc<Self>, task: F) -> F::Output {
        let _permit = self.clone().acquire().await;
        task.await
    }

    async fn acquire(self: Rc<Self>) -> Permit {
        if self.active.get() < self.limit {
            self.active.set(self.active.get() + 1);
        } else {
            let (ready, wait) = oneshot::channel();
            self.waiting.borrow_mut().push_back(ready);
            // The releasing task hands its slot over without decrementing
            let _ = wait.await;
        }
        Permit { queue: self }
    }

    fn release(&self) {
        loop {
            let next = self.waiting.borrow_mut().pop_front();
            match next {
                Some(waiter) => {
                    if waiter.send(()).is_ok() {
                        return;
                    }
                }
                None => {
                    self.active.set(self.active.get().saturating_sub(1));
                    return;
                }
            }
        }
    }
}

type Composition = Shared<LocalBoxFuture<'static, Result<String>>>;

/// Composed favicons keyed by `(instance, effect, color)`
pub struct FaviconEngine {
    cache: RefCell<HashMap<CacheKey, String>>,
    /// Running compositions, tagged so a result is only kept while its entry is current
    in_flight: RefCell<HashMap<CacheKey, (u64, Composition)>>,
    queue: Rc<WorkQueue>,
    generation: Cell<u64>,
}

impl FaviconEngine {
    pub fn new() -> Self {
        FaviconEngine {
            cache: RefCell::new(HashMap::new()),
            in_flight: RefCell::new(HashMap::new()),
            queue: WorkQueue::new(MAX_CONCURRENT_COMPOSITIONS),
            generation: Cell::new(0),
        }
    }

    pub fn cached(&self, key: &CacheKey) -> Option<String> {
        self.cache.borrow().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }

    /// Drop everything, including results still being composed
    pub fn purge(&self) {
        self.cache.borrow_mut().clear();
        self.in_flight.borrow_mut().clear();
        debug!("favicon cache purged");
    }

    /// Drop entries for one instance, including results still being composed
    pub fn forget_instance(&self, instance: &str) {
        self.cache.borrow_mut().retain(|key, _| key.instance != instance);
        self.in_flight.borrow_mut().retain(|key, _| key.instance != instance);
    }

    /// Cached data URL for `key`, composing it at most once across concurrent callers
    pub async fn decorate<C>(&self, key: CacheKey, compose: C) -> Result<String>
    where
        C: FnOnce() -> LocalBoxFuture<'static, Result<String>>,
    {
        if let Some(hit) = self.cached(&key) {
            return Ok(hit);
        }

        let existing = self.in_flight.borrow().get(&key).cloned();
        let (generation, composition) = match existing {
            Some(entry) => entry,
            None => {
                let generation = self.generation.get() + 1;
                self.generation.set(generation);
                let composition = self.queue.clone().run(compose()).boxed_local().shared();
                self.in_flight.borrow_mut().insert(key.clone(), (generation, composition.clone()));
                (generation, composition)
            }
        };

        let result = composition.await;
        let current = self.in_flight.borrow().get(&key).is_some_and(|(g, _)| *g == generation);
        if current {
            self.in_flight.borrow_mut().remove(&key);
            if let Ok(data_url) = &result {
                self.cache.borrow_mut().insert(key, data_url.clone());
            }
        }
        result
    }
}

impl Default for FaviconEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::testing::yield_now;
    use futures::executor::{LocalPool, block_on};
    use futures::task::LocalSpawnExt;

    fn decode_data_url(data_url: &str) -> RgbaImage {
        let encoded = data_url.strip_prefix("data:image/png;base64,").unwrap();
        let bytes = STANDARD.decode(encoded).unwrap();
        image::load_from_memory(&bytes).unwrap().to_rgba8()
    }

    fn scenario_rules() -> RuleSet {
        RuleSet::compile(&[
            FaviconRule::new("^staging-.*", FaviconEffect::StripeLeft, Some("#ffcc00")),
            FaviconRule::new(".*", FaviconEffect::TintedLogo, Some("#0a0a0a")),
        ])
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ffcc00").unwrap(), Rgba([255, 204, 0, 255]));
        assert_eq!(parse_color("#fc0").unwrap(), Rgba([255, 204, 0, 255]));
        assert_eq!(parse_color("#0a0a0a80").unwrap(), Rgba([10, 10, 10, 128]));
        assert!(parse_color("ffcc00").is_err());
        assert!(parse_color("#ffcc0").is_err());
        assert!(parse_color("#gggggg").is_err());
        assert_eq!(to_hex(neutral()), DEFAULT_COLOR);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = scenario_rules();

        let staging = rules.select("staging-alpha");
        assert_eq!(staging.effect, FaviconEffect::StripeLeft);
        assert_eq!(staging.color, Rgba([255, 204, 0, 255]));

        let prod = rules.select("prod");
        assert_eq!(prod.effect, FaviconEffect::TintedLogo);
        assert_eq!(prod.color, Rgba([10, 10, 10, 255]));
    }

    #[test]
    fn test_selection_matches_first_rule_for_every_instance() {
        let rule_list = vec![
            FaviconRule::new("^dev", FaviconEffect::StripeTop, Some("#00ff00")),
            FaviconRule::new("test", FaviconEffect::StripeBottom, Some("#0000ff")),
            FaviconRule::new("^dev-test$", FaviconEffect::InstanceLogo, None),
        ];
        let rules = RuleSet::compile(&rule_list);

        for instance in ["dev-test", "devx", "qa-test", "prod", "test"] {
            let expected = rule_list
                .iter()
                .find(|rule| Regex::new(&rule.pattern).unwrap().is_match(instance))
                .map(|rule| rule.effect)
                .unwrap_or(FaviconEffect::TintedLogo);
            assert_eq!(rules.select(instance).effect, expected, "instance {}", instance);
        }
    }

    #[test]
    fn test_invalid_rules_skipped() {
        let rules = RuleSet::compile(&[
            FaviconRule::new("([", FaviconEffect::StripeTop, Some("#ff0000")),
            FaviconRule::new(".*", FaviconEffect::StripeTop, Some("red")),
            FaviconRule::new("^acme$", FaviconEffect::StripeRight, Some("#ff0000")),
        ]);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.select("acme").effect, FaviconEffect::StripeRight);
        assert_eq!(rules.select("beta"), Decoration::fallback());
    }

    #[test]
    fn test_left_stripe_covers_quarter() {
        let decoration = scenario_rules().select("staging-alpha");
        let image = decode_data_url(&to_data_url(&render(&decoration, None).unwrap()).unwrap());

        let yellow = Rgba([255, 204, 0, 255]);
        assert_eq!(image.dimensions(), (ICON_SIZE, ICON_SIZE));
        assert_eq!(*image.get_pixel(0, 16), yellow);
        assert_eq!(*image.get_pixel(ICON_SIZE / 4 - 1, 0), yellow);
        assert_ne!(*image.get_pixel(ICON_SIZE / 4, 0), yellow);
        assert_ne!(*image.get_pixel(ICON_SIZE - 1, 16), yellow);
    }

    #[test]
    fn test_stripe_over_original_favicon() {
        let original = RgbaImage::from_pixel(ICON_SIZE, ICON_SIZE, Rgba([0, 0, 255, 255]));
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(original).write_to(&mut bytes, ImageFormat::Png).unwrap();

        let decoration = Decoration {
            effect: FaviconEffect::StripeBottom,
            color: Rgba([255, 0, 0, 255]),
        };
        let image = render(&decoration, Some(bytes.get_ref().as_slice())).unwrap();

        assert_eq!(*image.get_pixel(16, ICON_SIZE - 1), Rgba([255, 0, 0, 255]));
        assert_eq!(*image.get_pixel(16, 4), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_tinted_logo() {
        let decoration = scenario_rules().select("prod");
        let image = render(&decoration, None).unwrap();

        assert_eq!(*image.get_pixel(1, 1), Rgba([10, 10, 10, 255]));
        assert_eq!(*image.get_pixel(23, ICON_SIZE - 7), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_undecodable_logo_falls_back() {
        let decoration = Decoration {
            effect: FaviconEffect::InstanceLogo,
            color: Rgba([1, 2, 3, 255]),
        };
        let image = render(&decoration, Some(b"<svg/>")).unwrap();
        assert_eq!(*image.get_pixel(1, 1), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn test_cache_hit_skips_composition() {
        let engine = FaviconEngine::new();
        let key = Decoration::fallback().cache_key("acme");
        let calls = Rc::new(Cell::new(0));

        for _ in 0..2 {
            let calls = calls.clone();
            let url = block_on(engine.decorate(key.clone(), move || {
                calls.set(calls.get() + 1);
                async { Ok("data:image/png;base64,AAAA".to_string()) }.boxed_local()
            }))
            .unwrap();
            assert_eq!(url, "data:image/png;base64,AAAA");
        }

        assert_eq!(calls.get(), 1);
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_concurrent_requests_share_composition() {
        let engine = FaviconEngine::new();
        let key = Decoration::fallback().cache_key("acme");
        let calls = Rc::new(Cell::new(0));

        let compose = |calls: Rc<Cell<usize>>| {
            move || {
                calls.set(calls.get() + 1);
                async {
                    yield_now().await;
                    Ok("data:shared".to_string())
                }
                .boxed_local()
            }
        };

        let (a, b) = block_on(async {
            futures::join!(
                engine.decorate(key.clone(), compose(calls.clone())),
                engine.decorate(key.clone(), compose(calls.clone()))
            )
        });

        assert_eq!(a.unwrap(), "data:shared");
        assert_eq!(b.unwrap(), "data:shared");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_failed_composition_not_cached() {
        let engine = FaviconEngine::new();
        let key = Decoration::fallback().cache_key("acme");

        let result = block_on(engine.decorate(key.clone(), || {
            async { Err(ToolkitError::Favicon("boom".to_string())) }.boxed_local()
        }));
        assert!(result.is_err());
        assert!(engine.cached(&key).is_none());
    }

    #[test]
    fn test_purge_and_forget() {
        let engine = FaviconEngine::new();
        for instance in ["acme", "beta"] {
            let key = Decoration::fallback().cache_key(instance);
            block_on(engine.decorate(key, || async { Ok("data:x".to_string()) }.boxed_local())).unwrap();
        }

        engine.forget_instance("acme");
        assert_eq!(engine.len(), 1);
        engine.purge();
        assert!(engine.is_empty());
    }

    #[test]
    fn test_forgotten_instance_drops_running_composition() {
        let engine = FaviconEngine::new();
        let key = Decoration::fallback().cache_key("acme");

        let (result, ()) = block_on(async {
            futures::join!(
                engine.decorate(key.clone(), || {
                    async {
                        yield_now().await;
                        yield_now().await;
                        Ok("data:old-logo".to_string())
                    }
                    .boxed_local()
                }),
                async {
                    yield_now().await;
                    engine.forget_instance("acme");
                }
            )
        });

        assert_eq!(result.unwrap(), "data:old-logo");
        assert!(engine.cached(&key).is_none());
    }

    #[test]
    fn test_work_queue_bounds_concurrency() {
        let queue = WorkQueue::new(MAX_CONCURRENT_COMPOSITIONS);
        let running = Rc::new(Cell::new(0));
        let peak = Rc::new(Cell::new(0));
        let finished = Rc::new(Cell::new(0));

        let mut pool = LocalPool::new();
        for _ in 0..10 {
            let (queue, running, peak, finished) = (queue.clone(), running.clone(), peak.clone(), finished.clone());
            pool.spawner()
                .spawn_local(async move {
                    queue
                        .run(async {
                            running.set(running.get() + 1);
                            peak.set(peak.get().max(running.get()));
                            yield_now().await;
                            yield_now().await;
                            running.set(running.get() - 1);
                            finished.set(finished.get() + 1);
                        })
                        .await
                })
                .unwrap();
        }
        pool.run();

        assert_eq!(finished.get(), 10);
        assert_eq!(peak.get(), MAX_CONCURRENT_COMPOSITIONS);
        assert_eq!(queue.active(), 0);
        assert_eq!(queue.waiting(), 0);
    }
}
