//! Built-in record schemas.
//!
//! Directory types chain through their parents (`WorldDir` → `PanelDir` →
//! `RndDir` → `ObjectDir` → object header); each link is a full record with
//! its own revision word.

use milo_types::VersionTag;

use crate::field::{FieldCodec, FieldSpec, Gate};
use crate::schema::{RevisionRange, Schema, SchemaBase};

pub static OBJECT_DIR: Schema = Schema {
    name: "ObjectDir",
    revisions: RevisionRange::up_to(27),
    max_alt: 1,
    base: SchemaBase::Object,
    fields: &[
        FieldSpec::new("proxy_file", Gate::Since(2), FieldCodec::Symbol),
        FieldSpec::new("inline_proxy", Gate::Since(13), FieldCodec::Bool),
        FieldSpec::new("subdirs", Gate::Since(3), FieldCodec::SymbolList { max: 64 }),
        FieldSpec::new("inline_subdir_type", Gate::Since(21), FieldCodec::Byte),
        FieldSpec::new("path_name", Gate::Since(17), FieldCodec::Symbol),
        FieldSpec::new("tool_data", Gate::AltSince(1), FieldCodec::UInt),
    ],
    owns_directory: true,
};

pub static RND_DIR: Schema = Schema {
    name: "RndDir",
    revisions: RevisionRange::up_to(10),
    max_alt: 0,
    base: SchemaBase::Record(&OBJECT_DIR),
    fields: &[
        FieldSpec::new("environ", Gate::Since(2), FieldCodec::Symbol),
        FieldSpec::new("test_event", Gate::Since(8), FieldCodec::Symbol),
        FieldSpec::new("showing", Gate::Always, FieldCodec::Bool),
    ],
    owns_directory: true,
};

pub static PANEL_DIR: Schema = Schema {
    name: "PanelDir",
    revisions: RevisionRange::up_to(8),
    max_alt: 0,
    base: SchemaBase::Record(&RND_DIR),
    fields: &[
        FieldSpec::new("cam", Gate::Since(1), FieldCodec::Symbol),
        FieldSpec::new("can_end_world", Gate::Since(2), FieldCodec::Bool),
        FieldSpec::new("front_view_only", Gate::Since(7), FieldCodec::SymbolList { max: 32 }),
        FieldSpec::new("back_view_only", Gate::Since(7), FieldCodec::SymbolList { max: 32 }),
        FieldSpec::new("use_specified_cam", Gate::Since(8), FieldCodec::Bool),
    ],
    owns_directory: true,
};

pub static WORLD_DIR: Schema = Schema {
    name: "WorldDir",
    revisions: RevisionRange::up_to(23),
    max_alt: 0,
    base: SchemaBase::Record(&PANEL_DIR),
    fields: &[
        FieldSpec::new("hud", Gate::Since(10), FieldCodec::Symbol),
        FieldSpec::new("fake_hud_filename", Gate::Between(13, 15), FieldCodec::Symbol),
        FieldSpec::new("glow_strength", Gate::Since(18), FieldCodec::Float),
        FieldSpec::new("camera_shake_max", Gate::Above(19), FieldCodec::Float),
    ],
    owns_directory: true,
};

pub static UI_LABEL_DIR: Schema = Schema {
    name: "UILabelDir",
    revisions: RevisionRange::up_to(3),
    max_alt: 0,
    base: SchemaBase::Record(&RND_DIR),
    fields: &[
        FieldSpec::new("text_token", Gate::Always, FieldCodec::Symbol),
        FieldSpec::new("icon", Gate::Since(1), FieldCodec::Symbol),
        FieldSpec::new("allcaps", Gate::Since(2), FieldCodec::Bool),
        FieldSpec::new("color_override", Gate::Since(3), FieldCodec::Int),
    ],
    owns_directory: true,
};

// Revisions 16..=19 stored an extra blend word that was folded into the
// stillness value from 20 on.
fn has_legacy_blend(tag: VersionTag) -> bool {
    (16..20).contains(&tag.revision)
}

pub static CHAR_CLIP_SET: Schema = Schema {
    name: "CharClipSet",
    revisions: RevisionRange::up_to(25),
    max_alt: 0,
    base: SchemaBase::Record(&OBJECT_DIR),
    fields: &[
        FieldSpec::new("char_file", Gate::Always, FieldCodec::Symbol),
        FieldSpec::new(
            "clip_type",
            Gate::Any(&[Gate::Exactly(11), Gate::Since(22)]),
            FieldCodec::Symbol,
        ),
        FieldSpec::new("preview_clip", Gate::Since(15), FieldCodec::Symbol),
        FieldSpec::new("legacy_blend", Gate::Custom(has_legacy_blend), FieldCodec::Bytes(4)),
        FieldSpec::new("stillness", Gate::Before(20), FieldCodec::Int),
        FieldSpec::new(
            "preview_walk",
            Gate::All(&[Gate::Since(18), Gate::Before(24)]),
            FieldCodec::Bool,
        ),
    ],
    owns_directory: true,
};

pub static BAND_SONG_PREF: Schema = Schema {
    name: "BandSongPref",
    revisions: RevisionRange::up_to(1),
    max_alt: 0,
    base: SchemaBase::Object,
    fields: &[
        FieldSpec::new("part2_instrument", Gate::Always, FieldCodec::Symbol),
        FieldSpec::new("part3_instrument", Gate::Always, FieldCodec::Symbol),
        FieldSpec::new("part4_instrument", Gate::Since(1), FieldCodec::Symbol),
        FieldSpec::new("animation_genre", Gate::Since(1), FieldCodec::Symbol),
    ],
    owns_directory: false,
};

/// Every schema `Registry::builtin` registers.
pub static BUILTIN: &[&Schema] = &[
    &OBJECT_DIR,
    &RND_DIR,
    &PANEL_DIR,
    &WORLD_DIR,
    &UI_LABEL_DIR,
    &CHAR_CLIP_SET,
    &BAND_SONG_PREF,
];

pub fn find(name: &str) -> Option<&'static Schema> {
    BUILTIN.iter().copied().find(|schema| schema.name == name)
}
