//! The built-in repertoire policy

use super::*;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn choice(codepoints: &str, line: Option<i32>) -> SampleChoice {
    SampleChoice {
        codepoints: codepoints.to_string(),
        line,
    }
}

fn alias(source: &str, line: Option<i32>, target: &str) -> SampleAlias {
    SampleAlias {
        source: source.to_string(),
        line,
        target: target.to_string(),
    }
}

fn spacing(glyphs: &[&str], width_pads: Option<f64>, shift_pads: Option<f64>) -> SpacingException {
    SpacingException {
        glyphs: names(glyphs),
        width_pads,
        shift_pads,
    }
}

fn special(codepoints: &str, ops: Vec<OutlineOp>) -> TransformOverride {
    TransformOverride {
        codepoints: codepoints.to_string(),
        ops,
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            font: FontInfo::default(),
            references: ReferenceSets::default(),
            samples: SampleTables {
                choices: vec![
                    choice("C", Some(4)),
                    choice("G", Some(4)),
                    choice("as", None),
                    choice("I", Some(4)),
                ],
                aliases: vec![
                    alias("I", Some(4), "|"),
                    alias("-", None, "\u{2010}"),
                    alias(".", None, "\u{00B7}"),
                    alias("!", None, "\u{00A1}"),
                    alias("?", None, "\u{00BF}"),
                    alias("\u{226A}", None, "\u{00AB}"),
                    alias("\u{226B}", None, "\u{00BB}"),
                ],
            },
            spacing: SpacingTable::default(),
            line_weights: vec![LineWeight {
                line: 0,
                width: 10.0,
            }],
            overrides: vec![
                special(
                    "U.ss01",
                    vec![OutlineOp::scale(0.9, 0.9), OutlineOp::Weight { width: 8.0 }],
                ),
                special("I.sc", vec![OutlineOp::translate(0.0, -30.0)]),
                special(
                    "I.ss01",
                    vec![OutlineOp::translate(0.0, -40.0), OutlineOp::rotate(-2.0)],
                ),
                special(
                    "|",
                    vec![OutlineOp::scale(1.0, 1.3), OutlineOp::translate(0.0, -100.0)],
                ),
                special("-", vec![OutlineOp::scale(0.9, 1.0)]),
                special("\u{2010}", vec![OutlineOp::scale(0.9, 1.0)]),
                special("\u{2010}", vec![OutlineOp::translate(0.0, -70.0)]),
                special("\u{00B7}", vec![OutlineOp::translate(0.0, 220.0)]),
                special("\u{00AB}", vec![OutlineOp::scale(0.8, 1.0)]),
                special("\u{00BB}", vec![OutlineOp::scale(0.8, 1.0)]),
                special("\u{2018}", vec![OutlineOp::rotate(15.0)]),
                special("\u{2019}", vec![OutlineOp::rotate(-15.0)]),
                special(
                    "\u{00BF}",
                    vec![OutlineOp::rotate(180.0), OutlineOp::translate(0.0, -120.0)],
                ),
                special(
                    "\u{00A1}",
                    vec![OutlineOp::rotate(180.0), OutlineOp::translate(0.0, -120.0)],
                ),
                special("\u{203D}", vec![OutlineOp::translate(0.0, -30.0)]),
            ],
            finalize: FinalizeSettings {
                tolerance: 0.5,
                passes: 2,
            },
            space_width: 256.0,
            compose: ComposeTables::default(),
            anchors: AnchorTables::default(),
            kerning: KerningTables::default(),
        }
    }
}

impl Default for ReferenceSets {
    fn default() -> Self {
        Self {
            baseline: vec!['m', 'A', 'E', 'M', '&', '@', '.', '\u{203D}'],
            cap_height: vec![
                'S', 'T', 'J', 'k', 't', 'l', 'b', 'd', '1', '2', '3', '\u{226A}', '\u{203D}',
                '?', '!',
            ],
        }
    }
}

impl Default for SpacingTable {
    fn default() -> Self {
        Self {
            side_padding: 20.0,
            default_width_pads: 2.0,
            default_shift_pads: 1.0,
            exceptions: vec![
                spacing(&["one"], Some(4.0), Some(3.0)),
                spacing(
                    &["C", "F", "J", "Q", "T", "f", "q", "r", "five"],
                    Some(0.0),
                    None,
                ),
                spacing(&["T_T"], Some(-2.0), None),
                spacing(&["f"], None, Some(0.0)),
                spacing(&["y", "comma", "semicolon"], None, Some(-1.0)),
                spacing(&["g", "j"], None, Some(-3.0)),
            ],
        }
    }
}

impl Default for FinalizeSettings {
    fn default() -> Self {
        Self {
            tolerance: 0.5,
            passes: 2,
        }
    }
}

fn carve(
    source: &str,
    prepare: Vec<OutlineOp>,
    spacing: Option<&str>,
    combining: &str,
    class: AnchorClass,
    scale: f64,
) -> CarveRecipe {
    CarveRecipe {
        source: source.to_string(),
        prepare,
        spacing: spacing.map(str::to_string),
        combining: combining.to_string(),
        class,
        scale,
        cut: 540.0,
        center_on_mark: matches!(source, "j" | "Emacron" | "Udieresis"),
        basemark_drop: if matches!(combining, "gravecomb" | "acutecomb" | "uni030A") {
            35.0
        } else {
            0.0
        },
    }
}

fn base(source: &str, target: &str, lowercase: bool) -> BaseRecipe {
    BaseRecipe {
        source: source.to_string(),
        target: target.to_string(),
        cut: if lowercase { 420.0 } else { 540.0 },
        min_top: 350.0,
        center_on_accent: source == "j",
    }
}

fn mark_anchor(class: AnchorClass, role: AnchorRole, y: Option<f64>) -> AnchorSpec {
    AnchorSpec {
        class,
        role,
        x: 0.0,
        y,
    }
}

impl Default for ComposeTables {
    fn default() -> Self {
        use AnchorClass::{Bottom, LowerRightEnd, Top, Top1, UpperRight};
        use AnchorRole::{BaseMark, Mark};

        let t = OutlineOp::translate;
        let s = OutlineOp::scale;

        Self {
            carve: vec![
                carve("Ograve", vec![], Some("grave"), "gravecomb", Top, 1.0),
                carve("Udieresis", vec![], Some("dieresis"), "uni0308", Top, 1.0),
                carve("Aring", vec![], Some("degree"), "uni030A", Top, 1.0),
                carve("Eacute", vec![], Some("acute"), "acutecomb", Top, 1.0),
                carve("Emacron", vec![], Some("macron"), "uni0304", Top, 1.0),
                carve(
                    "asciicircum",
                    vec![t(0.0, 100.0)],
                    Some("circumflex"),
                    "uni0302",
                    Top,
                    0.8,
                ),
                carve(
                    "asciicircum",
                    vec![t(0.0, 100.0), OutlineOp::rotate(180.0)],
                    Some("caron"),
                    "uni030C",
                    Top,
                    0.8,
                ),
                carve(
                    "asciitilde",
                    vec![t(0.0, 200.0)],
                    Some("tilde"),
                    "tildecomb",
                    Top,
                    0.8,
                ),
                carve(
                    "minute",
                    vec![t(0.0, -80.0)],
                    Some("uni02BC"),
                    "uni0315",
                    UpperRight,
                    1.0,
                ),
                carve("Ohungarumlaut", vec![], Some("hungarumlaut"), "uni030B", Top, 1.0),
                carve("j", vec![], Some("dotaccent"), "uni0307", Top, 1.0),
                carve(
                    "comma",
                    vec![OutlineOp::rotate(180.0), t(0.0, 600.0)],
                    Some("uni02BB"),
                    "uni0312",
                    Top,
                    1.0,
                ),
                carve("comma", vec![], None, "uni0326", Bottom, 1.0),
            ],
            bases: vec![
                base("Ograve", "O.sc", false),
                base("Udieresis", "U.sc", false),
                base("Aring", "A.sc", false),
                base("Eacute", "E.sc", false),
                base("i", "dotlessi", true),
                base("j", "uni0237", true),
            ],
            derived_marks: vec![
                DerivedMarkRecipe {
                    spacing: "cedilla".into(),
                    combining: "uni0327".into(),
                    subject: SourceOutline::new("plus", vec![t(-18.0, 400.0)]),
                    clip: SourceOutline::new("five", vec![]),
                    bands: vec![BandFilter::Above { y: 500.0 }],
                    ops: vec![t(0.0, -560.0), s(0.6, 0.35)],
                    stroke_width: 10.0,
                    stroke_passes: 2,
                    combining_shift: -120.0,
                    anchors: vec![mark_anchor(Bottom, Mark, Some(0.0))],
                    final_shift: -210.0,
                },
                DerivedMarkRecipe {
                    spacing: "breve".into(),
                    combining: "uni0306".into(),
                    subject: SourceOutline::new("minus", vec![t(-100.0, 0.0), s(2.0, 1.0)]),
                    clip: SourceOutline::new("G", vec![]),
                    bands: vec![BandFilter::Above { y: 300.0 }],
                    ops: vec![s(0.6, 0.5), t(0.0, 500.0)],
                    stroke_width: 10.0,
                    stroke_passes: 2,
                    combining_shift: -140.0,
                    anchors: vec![
                        mark_anchor(Top, Mark, Some(460.0)),
                        mark_anchor(Top1, Mark, Some(460.0)),
                        mark_anchor(Top1, BaseMark, None),
                    ],
                    final_shift: -210.0,
                },
                DerivedMarkRecipe {
                    spacing: "ogonek".into(),
                    combining: "uni0328".into(),
                    subject: SourceOutline::new("plus", vec![t(-18.0, 250.0)]),
                    clip: SourceOutline::new("c", vec![]),
                    bands: vec![BandFilter::Above { y: 300.0 }],
                    ops: vec![t(0.0, -370.0), s(0.5, 0.5)],
                    stroke_width: 10.0,
                    stroke_passes: 2,
                    combining_shift: -105.0,
                    anchors: vec![mark_anchor(LowerRightEnd, Mark, Some(0.0))],
                    final_shift: -210.0,
                },
            ],
            overlay_marks: vec![
                OverlayRecipe {
                    name: "uni0337".into(),
                    source: "percent".into(),
                    bands: vec![BandFilter::Above { y: 200.0 }, BandFilter::Below { y: 300.0 }],
                    rotate_onto_baseline: None,
                    right_margin: 20.0,
                },
                OverlayRecipe {
                    name: "uni0338".into(),
                    source: "slash".into(),
                    bands: vec![],
                    rotate_onto_baseline: Some(-10.0),
                    right_margin: 40.0,
                },
            ],
            derived_glyphs: vec![
                DerivedGlyph {
                    name: "W.ss01".into(),
                    parts: vec![SourceOutline::new("W", vec![t(0.0, -20.0)])],
                    width_from: Some("W".into()),
                    bearings: None,
                },
                DerivedGlyph {
                    name: "Y.ss01".into(),
                    parts: vec![SourceOutline::new(
                        "Y",
                        vec![OutlineOp::RotateOntoBaseline { degrees: 5.0 }, t(0.0, -20.0)],
                    )],
                    width_from: None,
                    bearings: Some((20.0, 40.0)),
                },
                DerivedGlyph {
                    name: "longs".into(),
                    parts: vec![SourceOutline::new(
                        "uni0237",
                        vec![OutlineOp::RotateOntoBaseline { degrees: 175.0 }],
                    )],
                    width_from: None,
                    bearings: Some((20.0, 40.0)),
                },
                DerivedGlyph {
                    name: "IJ".into(),
                    parts: vec![
                        SourceOutline::new("J", vec![t(60.0, 0.0)]),
                        SourceOutline::new("dotlessi", vec![s(1.0, 1.4), t(-30.0, 160.0)]),
                    ],
                    width_from: Some("J".into()),
                    bearings: None,
                },
            ],
            anchored: ('A'..='Z')
                .chain('a'..='z')
                .map(String::from)
                .chain(names(&["Udieresis", "Aring"]))
                .collect(),
            digraphs: vec![
                DigraphRecipe::new("A", "E", "AE", -120.0, true),
                DigraphRecipe::new("longs", "s", "germandbls", -180.0, false),
                DigraphRecipe::new("a", "e", "ae", -120.0, true),
                DigraphRecipe::new("i", "j", "ij", -120.0, false),
                DigraphRecipe::new("O", "E", "OE", -120.0, false),
                DigraphRecipe::new("o", "e", "oe", -120.0, false),
            ],
            accents: AccentRules::default(),
            late_digraphs: vec![
                DigraphRecipe::new("D", "Zcaron", "uni01C4", -120.0, false),
                DigraphRecipe::new("D", "zcaron", "uni01C5", -120.0, false),
                DigraphRecipe::new("d", "zcaron", "uni01C6", -120.0, false),
                DigraphRecipe::new("D", "Z", "uni01F1", -120.0, false),
                DigraphRecipe::new("D", "z", "uni01F2", -120.0, false),
                DigraphRecipe::new("d", "z", "uni01F3", -120.0, false),
            ],
            variants: vec![
                VariantFeature {
                    suffix: "ss01".into(),
                    feature: "ss01".into(),
                    after: names(&["T"]),
                },
                VariantFeature {
                    suffix: "sc".into(),
                    feature: "smcp".into(),
                    after: vec![],
                },
            ],
            bearings: (20.0, 40.0),
        }
    }
}

impl Default for AccentRules {
    fn default() -> Self {
        Self {
            sweep: (0x00C0, 0x01FF),
            exceptions: vec![
                DecompositionException {
                    target: '\u{00D8}',
                    base: 'O',
                    mark: '\u{0338}',
                },
                DecompositionException {
                    target: '\u{00F8}',
                    base: 'o',
                    mark: '\u{0337}',
                },
            ],
            dotless: vec![
                DotlessRule {
                    base: 'i',
                    replacement: '\u{0131}',
                },
                DotlessRule {
                    base: 'j',
                    replacement: '\u{0237}',
                },
            ],
            dotless_marks: (0x0300, 0x0314),
            substitutions: vec![
                MarkSubstitution {
                    mark: '\u{030C}',
                    replacement: '\u{0315}',
                    bases: vec!['d', 'L', 'l', 't'],
                    unless: false,
                },
                MarkSubstitution {
                    mark: '\u{0327}',
                    replacement: '\u{0312}',
                    bases: vec!['g'],
                    unless: false,
                },
                MarkSubstitution {
                    mark: '\u{0327}',
                    replacement: '\u{0326}',
                    bases: vec!['C', 'c', 'E', 'e', 'S', 's', 'T', 't'],
                    unless: true,
                },
            ],
            respaced_bases: names(&["dotlessi"]),
            widened: vec![WidenRule {
                targets: names(&["dcaron", "lcaron"]),
                mark: "uni0315".into(),
                amount: 80.0,
            }],
            placements: vec![
                PlacementRule {
                    first: "L_L".into(),
                    second: "uni0315".into(),
                    x_placement: -80,
                },
                PlacementRule {
                    first: "t_t".into(),
                    second: "uni0315".into(),
                    x_placement: -80,
                },
            ],
        }
    }
}

impl Default for AnchorTables {
    fn default() -> Self {
        let top = |glyph: &str, y: Option<f64>, dy: f64| TopOverride {
            glyph: glyph.to_string(),
            y,
            dy,
        };
        Self {
            left_margin: 20.0,
            right_margin: 40.0,
            top_overrides: vec![
                top("I", Some(620.0), 0.0),
                top("Eacute", None, -35.0),
                top("Ograve", None, -35.0),
                top("Aring", None, -35.0),
            ],
            upper_right_offsets: vec![
                HorizontalOffset {
                    glyph: "L".into(),
                    dx: -100.0,
                },
                HorizontalOffset {
                    glyph: "t".into(),
                    dx: -80.0,
                },
            ],
            probe_depth: 20.0,
        }
    }
}

fn pair(left: &[&str], right: &[&str], value: i32) -> KerningRule {
    KerningRule::Pair {
        left: names(left),
        right: names(right),
        value,
    }
}

fn pass(separation: f64, left: &[&str], right: &[&str], min_kern: f64, mode: PassMode) -> KerningRule {
    KerningRule::Pass {
        separation,
        left: names(left),
        right: names(right),
        min_kern,
        mode,
    }
}

impl Default for KerningTables {
    fn default() -> Self {
        use PassMode::{Any, OnlyTightening, Touching};
        const ALL: &str = LETTERS;

        let tight = |separation: f64, left: &[&str], right: &[&str]| {
            pass(separation, left, right, 30.0, OnlyTightening)
        };
        let touching = |separation: f64, left: &[&str], right: &[&str]| {
            pass(separation, left, right, 0.0, Touching)
        };

        let mut rules = vec![
            pass(150.0, &["slash", "backslash"], &["slash", "backslash"], 0.0, Any),
            pair(&["one"], &["one"], 80),
            pair(
                &[
                    "D", "F", "G", "J", "O", "P", "T", "V", "W", "Y", "T_T", "e", "f", "o", "p",
                    "r", "v",
                ],
                &["comma", "period"],
                -60,
            ),
        ];
        for (variant, value) in [
            ("U.ss01", -40),
            ("H.ss01", -80),
            ("I.ss01", -40),
            ("W.ss01", -80),
            ("Y.ss01", -80),
        ] {
            rules.push(pair(&["T", "T_T"], &[variant], value));
        }
        rules.extend([
            pass(30.0, &["C"], &[ALL], 30.0, Any),
            tight(60.0, &["r"], &[ALL]),
            tight(80.0, &["R", "C_R", "E_R", "R_R", "X"], &[ALL]),
            tight(80.0, &[ALL], &["X", "f", "t", "t_t"]),
            tight(90.0, &[ALL], &["g"]),
            tight(90.0, &["V", "v"], &[ALL]),
            tight(100.0, &["K", "k"], &[ALL]),
            tight(120.0, &[ALL], &["T", "Y", "Z"]),
            tight(120.0, &["Y", "Z", "P"], &[ALL]),
            tight(130.0, &["J", "T", "f"], &[ALL]),
            tight(130.0, &[ALL], &["T_O", "T_T"]),
            tight(140.0, &["r_r"], &[ALL]),
            tight(150.0, &["F"], &[ALL]),
            tight(180.0, &[ALL], &["j"]),
            tight(200.0, &["T_T"], &[ALL]),
            pass(20.0, &["L", "L_L", "E", "E_E"], &[ALL], 30.0, Touching),
            touching(110.0, &["L", "L_L"], &["j", "Y"]),
            touching(60.0, &["E", "E_E"], &["V", "v"]),
            touching(80.0, &["E", "E_E"], &["j"]),
            touching(70.0, &["a", "G"], &["t", "t_t"]),
            touching(30.0, &["i", "r_i"], &["f", "t"]),
            touching(60.0, &["X", "Z"], &["f", "t", "t_t"]),
            touching(60.0, &["r"], &["T", "T_O", "T_T", "X", "j"]),
            touching(100.0, &["r_r"], &["T", "T_O", "T_T", "X", "j"]),
            touching(60.0, &["P"], &["g"]),
            touching(40.0, &["C"], &["V", "v"]),
            touching(140.0, &["T"], &["V", "v"]),
            touching(40.0, &["V", "v"], &["J"]),
            touching(150.0, &["F"], &["z"]),
            touching(30.0, &["r"], &["i"]),
            pair(&["T_T"], &["O"], -70),
        ]);

        Self {
            leading: ShapeLetters {
                vertical_bar: "BDEFHIKLMNPRbhklmnr".into(),
                open_bowl: "ACGOQUacdeoqyu".into(),
                complex: "JSTVWXYZfgijpstvwxz".into(),
            },
            trailing: ShapeLetters {
                vertical_bar: "HIMNdhlmn".into(),
                open_bowl: "ABDOSUbgjopsuy".into(),
                complex: "CEFGJKLPQRTVWXYZacefikqrtvwxz".into(),
            },
            matrix: [[0, 0, -20, -30], [0, -20, -25, -30], [0, -30, -30, -30]],
            accent_suffixes: names(&[
                "grave",
                "acute",
                "circumflex",
                "tilde",
                "dieresis",
                "ring",
                "cedilla",
                "macron",
                "caron",
                "hungarumlaut",
                "dotaccent",
                "breve",
                "ogonek",
            ]),
            variant_suffixes: names(&["sc", "ss01"]),
            measurement_offsets: vec![
                MeasureOffset {
                    glyph: "T".into(),
                    dy: -30.0,
                },
                MeasureOffset {
                    glyph: "T_T".into(),
                    dy: -30.0,
                },
            ],
            profile_step: 10.0,
            rules,
        }
    }
}
