//! Writer for the ASCII DXF (AutoCAD 2000, AC1015) subset the renderer
//! emits: layer/linetype/style tables, block definitions, and LINE,
//! LWPOLYLINE, TEXT, MTEXT, INSERT and solid-HATCH entities.
//!
//! The drawing is assembled as tag/value pairs into plain strings; there is
//! no geometry kernel behind it.

use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

pub fn point(x: f64, y: f64) -> Point {
    Point { x, y }
}

/// `$INSUNITS` drawing units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    Unitless = 0,
    Millimeters = 4,
    Meters = 6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    #[default]
    Baseline = 0,
    Bottom = 1,
    Middle = 2,
    Top = 3,
}

/// MTEXT attachment point (group 71).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Attachment {
    #[default]
    TopLeft = 1,
    TopCenter = 2,
    TopRight = 3,
    MiddleLeft = 4,
    MiddleCenter = 5,
    MiddleRight = 6,
    BottomLeft = 7,
    BottomCenter = 8,
    BottomRight = 9,
}

#[derive(Debug, Clone, Default)]
pub struct EntityOptions {
    /// Defaults to layer "0".
    pub layer: Option<String>,
    /// AutoCAD color index override; absent means ByLayer.
    pub color: Option<i16>,
}

impl EntityOptions {
    pub fn on_layer(layer: &str) -> Self {
        Self {
            layer: Some(layer.to_string()),
            color: None,
        }
    }

    pub fn colored(color: i16) -> Self {
        Self {
            layer: None,
            color: Some(color),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextOptions {
    pub layer: Option<String>,
    pub color: Option<i16>,
    pub style: Option<String>,
    pub h_align: HAlign,
    pub v_align: VAlign,
}

#[derive(Debug, Clone, Default)]
pub struct MTextOptions {
    pub layer: Option<String>,
    pub style: Option<String>,
    pub attachment: Attachment,
    /// Reference column width the text wraps inside.
    pub width: f64,
}

struct LineTypeDef {
    handle: String,
    name: String,
    description: String,
    elements: Vec<f64>,
}

struct LayerDef {
    handle: String,
    name: String,
    color: i16,
    line_type: String,
}

struct StyleDef {
    handle: String,
    name: String,
    font_file: String,
}

struct BlockDef {
    record_handle: String,
    begin_handle: String,
    end_handle: String,
    name: String,
    layer: String,
    entities: String,
}

// Structural handles below 0x40; everything allocated at runtime starts
// above them.
const H_BLOCK_RECORD_TABLE: &str = "1";
const H_LAYER_TABLE: &str = "2";
const H_STYLE_TABLE: &str = "3";
const H_LTYPE_TABLE: &str = "5";
const H_VIEW_TABLE: &str = "6";
const H_UCS_TABLE: &str = "7";
const H_VPORT_TABLE: &str = "8";
const H_APPID_TABLE: &str = "9";
const H_DIMSTYLE_TABLE: &str = "A";
const H_ROOT_DICT: &str = "C";
const H_GROUP_DICT: &str = "D";
const H_LAYER_ZERO: &str = "10";
const H_STYLE_STANDARD: &str = "11";
const H_APPID_ACAD: &str = "12";
const H_LTYPE_BYBLOCK: &str = "14";
const H_LTYPE_BYLAYER: &str = "15";
const H_LTYPE_CONTINUOUS: &str = "16";
const H_PAPER_SPACE: &str = "1E";
const H_MODEL_SPACE: &str = "1F";
const H_MODEL_SPACE_BEGIN: &str = "20";
const H_MODEL_SPACE_END: &str = "21";
const H_PAPER_SPACE_BEGIN: &str = "22";
const H_PAPER_SPACE_END: &str = "23";

/// MTEXT value chunk size: overflow goes into code-3 groups.
const MTEXT_CHUNK: usize = 250;

pub struct DxfWriter {
    units: Units,
    next_handle: u32,
    line_types: Vec<LineTypeDef>,
    layers: Vec<LayerDef>,
    styles: Vec<StyleDef>,
    blocks: Vec<BlockDef>,
    open_block: Option<BlockDef>,
    entities: String,
}

impl DxfWriter {
    pub fn new() -> Self {
        Self {
            units: Units::Unitless,
            next_handle: 0x40,
            line_types: Vec::new(),
            layers: Vec::new(),
            styles: Vec::new(),
            blocks: Vec::new(),
            open_block: None,
            entities: String::new(),
        }
    }

    pub fn set_units(&mut self, units: Units) {
        self.units = units;
    }

    fn alloc_handle(&mut self) -> String {
        let handle = self.next_handle;
        self.next_handle += 1;
        format!("{handle:X}")
    }

    /// Register a dashed line type. `elements` are dash lengths, negative
    /// for gaps, matching the DXF convention.
    pub fn add_line_type(&mut self, name: &str, description: &str, elements: &[f64]) {
        let handle = self.alloc_handle();
        self.line_types.push(LineTypeDef {
            handle,
            name: name.to_string(),
            description: description.to_string(),
            elements: elements.to_vec(),
        });
    }

    pub fn add_layer(&mut self, name: &str, color: i16, line_type: &str) {
        let handle = self.alloc_handle();
        self.layers.push(LayerDef {
            handle,
            name: name.to_string(),
            color,
            line_type: line_type.to_string(),
        });
    }

    pub fn add_text_style(&mut self, name: &str, font_file: &str) {
        let handle = self.alloc_handle();
        self.styles.push(StyleDef {
            handle,
            name: name.to_string(),
            font_file: font_file.to_string(),
        });
    }

    /// Open a block definition; subsequent entities land inside it until
    /// `end_block`.
    pub fn begin_block(&mut self, name: &str, layer: &str) {
        debug_assert!(self.open_block.is_none(), "block already open");
        let record_handle = self.alloc_handle();
        let begin_handle = self.alloc_handle();
        let end_handle = self.alloc_handle();
        self.open_block = Some(BlockDef {
            record_handle,
            begin_handle,
            end_handle,
            name: name.to_string(),
            layer: layer.to_string(),
            entities: String::new(),
        });
    }

    pub fn end_block(&mut self) {
        let block = self.open_block.take().expect("no block open");
        self.blocks.push(block);
    }

    fn owner_handle(&self) -> String {
        match &self.open_block {
            Some(block) => block.record_handle.clone(),
            None => H_MODEL_SPACE.to_string(),
        }
    }

    fn entity_buffer(&mut self) -> &mut String {
        match &mut self.open_block {
            Some(block) => &mut block.entities,
            None => &mut self.entities,
        }
    }

    fn entity_header(&mut self, kind: &str, subclass: &str, opts: &EntityOptions) -> String {
        let handle = self.alloc_handle();
        let owner = self.owner_handle();
        let mut out = String::new();
        tag(&mut out, 0, kind);
        tag(&mut out, 5, &handle);
        tag(&mut out, 330, &owner);
        tag(&mut out, 100, "AcDbEntity");
        tag(&mut out, 8, opts.layer.as_deref().unwrap_or("0"));
        if let Some(color) = opts.color {
            tag(&mut out, 62, color);
        }
        tag(&mut out, 100, subclass);
        out
    }

    pub fn add_line(&mut self, a: Point, b: Point, opts: &EntityOptions) {
        let mut out = self.entity_header("LINE", "AcDbLine", opts);
        tag(&mut out, 10, a.x);
        tag(&mut out, 20, a.y);
        tag(&mut out, 30, 0.0);
        tag(&mut out, 11, b.x);
        tag(&mut out, 21, b.y);
        tag(&mut out, 31, 0.0);
        self.entity_buffer().push_str(&out);
    }

    pub fn add_lw_polyline(&mut self, points: &[Point], opts: &EntityOptions) {
        let mut out = self.entity_header("LWPOLYLINE", "AcDbPolyline", opts);
        tag(&mut out, 90, points.len());
        tag(&mut out, 70, 0);
        for p in points {
            tag(&mut out, 10, p.x);
            tag(&mut out, 20, p.y);
        }
        self.entity_buffer().push_str(&out);
    }

    pub fn add_text(&mut self, at: Point, height: f64, value: &str, opts: &TextOptions) {
        let entity_opts = EntityOptions {
            layer: opts.layer.clone(),
            color: opts.color,
        };
        let mut out = self.entity_header("TEXT", "AcDbText", &entity_opts);
        tag(&mut out, 10, at.x);
        tag(&mut out, 20, at.y);
        tag(&mut out, 30, 0.0);
        tag(&mut out, 40, height);
        tag(&mut out, 1, value);
        if let Some(style) = &opts.style {
            tag(&mut out, 7, style);
        }
        let aligned = opts.h_align != HAlign::Left || opts.v_align != VAlign::Baseline;
        if opts.h_align != HAlign::Left {
            tag(&mut out, 72, opts.h_align as i32);
        }
        if aligned {
            // Alignment is measured against the second point.
            tag(&mut out, 11, at.x);
            tag(&mut out, 21, at.y);
            tag(&mut out, 31, 0.0);
        }
        tag(&mut out, 100, "AcDbText");
        if opts.v_align != VAlign::Baseline {
            tag(&mut out, 73, opts.v_align as i32);
        }
        self.entity_buffer().push_str(&out);
    }

    pub fn add_mtext(&mut self, at: Point, char_height: f64, value: &str, opts: &MTextOptions) {
        let entity_opts = EntityOptions {
            layer: opts.layer.clone(),
            color: None,
        };
        let mut out = self.entity_header("MTEXT", "AcDbMText", &entity_opts);
        tag(&mut out, 10, at.x);
        tag(&mut out, 20, at.y);
        tag(&mut out, 30, 0.0);
        tag(&mut out, 40, char_height);
        if opts.width > 0.0 {
            tag(&mut out, 41, opts.width);
        }
        tag(&mut out, 71, opts.attachment as i32);
        tag(&mut out, 72, 1);
        let chars: Vec<char> = value.chars().collect();
        let mut rest: &[char] = &chars;
        while rest.len() > MTEXT_CHUNK {
            let (chunk, tail) = rest.split_at(MTEXT_CHUNK);
            tag(&mut out, 3, chunk.iter().collect::<String>());
            rest = tail;
        }
        tag(&mut out, 1, rest.iter().collect::<String>());
        if let Some(style) = &opts.style {
            tag(&mut out, 7, style);
        }
        self.entity_buffer().push_str(&out);
    }

    pub fn add_insert(&mut self, block_name: &str, at: Point, opts: &EntityOptions) {
        let mut out = self.entity_header("INSERT", "AcDbBlockReference", opts);
        tag(&mut out, 2, block_name);
        tag(&mut out, 10, at.x);
        tag(&mut out, 20, at.y);
        tag(&mut out, 30, 0.0);
        self.entity_buffer().push_str(&out);
    }

    /// Solid-filled hatch bounded by one closed polyline.
    pub fn add_solid_hatch(&mut self, boundary: &[Point], opts: &EntityOptions) {
        let mut out = self.entity_header("HATCH", "AcDbHatch", opts);
        tag(&mut out, 10, 0.0);
        tag(&mut out, 20, 0.0);
        tag(&mut out, 30, 0.0);
        tag(&mut out, 210, 0.0);
        tag(&mut out, 220, 0.0);
        tag(&mut out, 230, 1.0);
        tag(&mut out, 2, "SOLID");
        tag(&mut out, 70, 1);
        tag(&mut out, 71, 0);
        tag(&mut out, 91, 1);
        tag(&mut out, 92, 2);
        tag(&mut out, 72, 0);
        tag(&mut out, 73, 1);
        tag(&mut out, 93, boundary.len());
        for p in boundary {
            tag(&mut out, 10, p.x);
            tag(&mut out, 20, p.y);
        }
        tag(&mut out, 97, 0);
        tag(&mut out, 75, 0);
        tag(&mut out, 76, 1);
        tag(&mut out, 98, 0);
        self.entity_buffer().push_str(&out);
    }

    pub fn stringify(&self) -> String {
        let mut out = String::new();
        self.write_header(&mut out);
        self.write_tables(&mut out);
        self.write_blocks(&mut out);
        self.write_entities(&mut out);
        write_objects(&mut out);
        tag(&mut out, 0, "EOF");
        out
    }

    fn write_header(&self, out: &mut String) {
        tag(out, 0, "SECTION");
        tag(out, 2, "HEADER");
        tag(out, 9, "$ACADVER");
        tag(out, 1, "AC1015");
        tag(out, 9, "$INSUNITS");
        tag(out, 70, self.units as i32);
        tag(out, 9, "$HANDSEED");
        tag(out, 5, format!("{:X}", self.next_handle + 1));
        tag(out, 0, "ENDSEC");
    }

    fn write_tables(&self, out: &mut String) {
        tag(out, 0, "SECTION");
        tag(out, 2, "TABLES");

        open_table(out, "VPORT", H_VPORT_TABLE, 0);
        close_table(out);

        open_table(out, "LTYPE", H_LTYPE_TABLE, 3 + self.line_types.len());
        write_stock_line_type(out, H_LTYPE_BYBLOCK, "ByBlock");
        write_stock_line_type(out, H_LTYPE_BYLAYER, "ByLayer");
        write_stock_line_type(out, H_LTYPE_CONTINUOUS, "Continuous");
        for def in &self.line_types {
            tag(out, 0, "LTYPE");
            tag(out, 5, &def.handle);
            tag(out, 330, H_LTYPE_TABLE);
            tag(out, 100, "AcDbSymbolTableRecord");
            tag(out, 100, "AcDbLinetypeTableRecord");
            tag(out, 2, &def.name);
            tag(out, 70, 0);
            tag(out, 3, &def.description);
            tag(out, 72, 65);
            tag(out, 73, def.elements.len());
            tag(out, 40, def.elements.iter().map(|e| e.abs()).sum::<f64>());
            for element in &def.elements {
                tag(out, 49, *element);
                tag(out, 74, 0);
            }
        }
        close_table(out);

        open_table(out, "LAYER", H_LAYER_TABLE, 1 + self.layers.len());
        write_layer_record(out, H_LAYER_ZERO, "0", 7, "Continuous");
        for def in &self.layers {
            write_layer_record(out, &def.handle, &def.name, def.color, &def.line_type);
        }
        close_table(out);

        open_table(out, "STYLE", H_STYLE_TABLE, 1 + self.styles.len());
        write_style_record(out, H_STYLE_STANDARD, "Standard", "txt");
        for def in &self.styles {
            write_style_record(out, &def.handle, &def.name, &def.font_file);
        }
        close_table(out);

        open_table(out, "VIEW", H_VIEW_TABLE, 0);
        close_table(out);
        open_table(out, "UCS", H_UCS_TABLE, 0);
        close_table(out);

        open_table(out, "APPID", H_APPID_TABLE, 1);
        tag(out, 0, "APPID");
        tag(out, 5, H_APPID_ACAD);
        tag(out, 330, H_APPID_TABLE);
        tag(out, 100, "AcDbSymbolTableRecord");
        tag(out, 100, "AcDbRegAppTableRecord");
        tag(out, 2, "ACAD");
        tag(out, 70, 0);
        close_table(out);

        open_table(out, "DIMSTYLE", H_DIMSTYLE_TABLE, 0);
        tag(out, 100, "AcDbDimStyleTable");
        close_table(out);

        open_table(out, "BLOCK_RECORD", H_BLOCK_RECORD_TABLE, 2 + self.blocks.len());
        write_block_record(out, H_MODEL_SPACE, "*Model_Space");
        write_block_record(out, H_PAPER_SPACE, "*Paper_Space");
        for block in &self.blocks {
            write_block_record(out, &block.record_handle, &block.name);
        }
        close_table(out);

        tag(out, 0, "ENDSEC");
    }

    fn write_blocks(&self, out: &mut String) {
        tag(out, 0, "SECTION");
        tag(out, 2, "BLOCKS");
        write_block_shell(
            out,
            "*Model_Space",
            "0",
            H_MODEL_SPACE,
            H_MODEL_SPACE_BEGIN,
            H_MODEL_SPACE_END,
            "",
        );
        write_block_shell(
            out,
            "*Paper_Space",
            "0",
            H_PAPER_SPACE,
            H_PAPER_SPACE_BEGIN,
            H_PAPER_SPACE_END,
            "",
        );
        for block in &self.blocks {
            write_block_shell(
                out,
                &block.name,
                &block.layer,
                &block.record_handle,
                &block.begin_handle,
                &block.end_handle,
                &block.entities,
            );
        }
        tag(out, 0, "ENDSEC");
    }

    fn write_entities(&self, out: &mut String) {
        tag(out, 0, "SECTION");
        tag(out, 2, "ENTITIES");
        out.push_str(&self.entities);
        tag(out, 0, "ENDSEC");
    }
}

impl Default for DxfWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn tag(out: &mut String, code: i32, value: impl Display) {
    out.push_str(&format!("{code}\n{value}\n"));
}

fn open_table(out: &mut String, name: &str, handle: &str, count: usize) {
    tag(out, 0, "TABLE");
    tag(out, 2, name);
    tag(out, 5, handle);
    tag(out, 330, 0);
    tag(out, 100, "AcDbSymbolTable");
    tag(out, 70, count);
}

fn close_table(out: &mut String) {
    tag(out, 0, "ENDTAB");
}

fn write_stock_line_type(out: &mut String, handle: &str, name: &str) {
    tag(out, 0, "LTYPE");
    tag(out, 5, handle);
    tag(out, 330, H_LTYPE_TABLE);
    tag(out, 100, "AcDbSymbolTableRecord");
    tag(out, 100, "AcDbLinetypeTableRecord");
    tag(out, 2, name);
    tag(out, 70, 0);
    tag(out, 3, "");
    tag(out, 72, 65);
    tag(out, 73, 0);
    tag(out, 40, 0.0);
}

fn write_layer_record(out: &mut String, handle: &str, name: &str, color: i16, line_type: &str) {
    tag(out, 0, "LAYER");
    tag(out, 5, handle);
    tag(out, 330, H_LAYER_TABLE);
    tag(out, 100, "AcDbSymbolTableRecord");
    tag(out, 100, "AcDbLayerTableRecord");
    tag(out, 2, name);
    tag(out, 70, 0);
    tag(out, 62, color);
    tag(out, 6, line_type);
    tag(out, 370, -3);
    tag(out, 390, "F");
}

fn write_style_record(out: &mut String, handle: &str, name: &str, font_file: &str) {
    tag(out, 0, "STYLE");
    tag(out, 5, handle);
    tag(out, 330, H_STYLE_TABLE);
    tag(out, 100, "AcDbSymbolTableRecord");
    tag(out, 100, "AcDbTextStyleTableRecord");
    tag(out, 2, name);
    tag(out, 70, 0);
    tag(out, 40, 0.0);
    tag(out, 41, 1.0);
    tag(out, 50, 0.0);
    tag(out, 71, 0);
    tag(out, 42, 0.2);
    tag(out, 3, font_file);
    tag(out, 4, "");
}

fn write_block_record(out: &mut String, handle: &str, name: &str) {
    tag(out, 0, "BLOCK_RECORD");
    tag(out, 5, handle);
    tag(out, 330, H_BLOCK_RECORD_TABLE);
    tag(out, 100, "AcDbSymbolTableRecord");
    tag(out, 100, "AcDbBlockTableRecord");
    tag(out, 2, name);
}

#[allow(clippy::too_many_arguments)]
fn write_block_shell(
    out: &mut String,
    name: &str,
    layer: &str,
    record_handle: &str,
    begin_handle: &str,
    end_handle: &str,
    entities: &str,
) {
    tag(out, 0, "BLOCK");
    tag(out, 5, begin_handle);
    tag(out, 330, record_handle);
    tag(out, 100, "AcDbEntity");
    tag(out, 8, layer);
    tag(out, 100, "AcDbBlockBegin");
    tag(out, 2, name);
    tag(out, 70, 0);
    tag(out, 10, 0.0);
    tag(out, 20, 0.0);
    tag(out, 30, 0.0);
    tag(out, 3, name);
    tag(out, 1, "");
    out.push_str(entities);
    tag(out, 0, "ENDBLK");
    tag(out, 5, end_handle);
    tag(out, 330, record_handle);
    tag(out, 100, "AcDbEntity");
    tag(out, 8, layer);
    tag(out, 100, "AcDbBlockEnd");
}

fn write_objects(out: &mut String) {
    tag(out, 0, "SECTION");
    tag(out, 2, "OBJECTS");
    tag(out, 0, "DICTIONARY");
    tag(out, 5, H_ROOT_DICT);
    tag(out, 330, 0);
    tag(out, 100, "AcDbDictionary");
    tag(out, 281, 1);
    tag(out, 3, "ACAD_GROUP");
    tag(out, 350, H_GROUP_DICT);
    tag(out, 0, "DICTIONARY");
    tag(out, 5, H_GROUP_DICT);
    tag(out, 330, H_ROOT_DICT);
    tag(out, 100, "AcDbDictionary");
    tag(out, 281, 1);
    tag(out, 0, "ENDSEC");
}
