//! Rebuild a CDXML document from the target model.
//!
//! Arrows become a `graphic`/`arrow` pair, texts a `t`/`s` pair, and drawn
//! compounds re-enter through their embedded fragment cdxml, rescaled from
//! the fragment's own coordinate system into the target box. Everything is
//! wrapped into a fixed document envelope; fresh element ids come from a
//! monotonic counter above the envelope's reserved ids.

use quick_xml::escape::escape;

use crate::cdxml::elements::apply_offset_scale;
use crate::cdxml::node::attr_box;
use crate::error::CdxmlError;
use crate::geometry::BoundingBox;
use crate::output::SchemeData;
use crate::xml::XmlTree;

/// Ids used by the document envelope itself (font table, page).
const RESERVED_IDS: [u64; 2] = [1_000_000, 1_000_001];

struct ArrowInput {
    head: (f64, f64),
    tail: (f64, f64),
}

struct TextInput {
    text: String,
    bounds: BoundingBox,
}

struct CompoundInput {
    bounds: BoundingBox,
    cdxml: String,
    svg: Option<String>,
    text: Option<String>,
}

/// Builds one CDXML string from one scheme.
pub struct SchemeBuilder {
    scale: (f64, f64),
    arrows: Vec<ArrowInput>,
    texts: Vec<TextInput>,
    compounds: Vec<CompoundInput>,
    next_id: u64,
    next_z: u64,
}

impl SchemeBuilder {
    pub fn new(data: &SchemeData) -> Result<Self, CdxmlError> {
        let scale = match &data.graphic.scale {
            Some(s) => (s.h, s.v),
            None => (1.0, 1.0),
        };

        let mut arrows = Vec::new();
        let mut texts = Vec::new();
        for label in &data.label {
            if label.semantics == "arrow" {
                let head = label.head_position.as_ref().ok_or_else(|| missing(&label.tag, "head_position"))?;
                let tail = label.tail_position.as_ref().ok_or_else(|| missing(&label.tag, "tail_position"))?;
                arrows.push(ArrowInput {
                    head: (head.l, head.t),
                    tail: (tail.l, tail.t),
                });
            } else {
                let text = label.text.clone().ok_or_else(|| missing(&label.tag, "text"))?;
                let position = label.position.ok_or_else(|| missing(&label.tag, "position"))?;
                texts.push(TextInput {
                    text,
                    bounds: position.to_box(),
                });
            }
        }

        let mut compounds = Vec::new();
        for entry in &data.compound {
            let position = entry.position.ok_or_else(|| missing(&entry.tag, "position"))?;
            compounds.push(CompoundInput {
                bounds: position.to_box(),
                cdxml: entry.cdxml.clone(),
                svg: entry.svg.clone(),
                text: entry.text.clone(),
            });
        }

        Ok(SchemeBuilder {
            scale,
            arrows,
            texts,
            compounds,
            next_id: 0,
            next_z: 0,
        })
    }

    pub fn build(&mut self) -> Result<String, CdxmlError> {
        self.reset();
        let mut content = String::new();
        let arrows = std::mem::take(&mut self.arrows);
        for arrow in &arrows {
            content.push_str(&self.build_arrow(arrow));
        }
        self.arrows = arrows;
        let texts = std::mem::take(&mut self.texts);
        for text in &texts {
            content.push_str(&self.build_text(&text.text, text.bounds.left, text.bounds.bottom));
        }
        self.texts = texts;
        let compounds = std::mem::take(&mut self.compounds);
        for compound in &compounds {
            content.push_str(&self.build_compound(compound)?);
        }
        self.compounds = compounds;
        Ok(TEMPLATE
            .replace("{content}", &content)
            .replace('\n', "")
            .replace('\r', ""))
    }

    fn reset(&mut self) {
        self.next_id = RESERVED_IDS.iter().copied().max().unwrap_or(0);
        self.next_z = 0;
    }

    fn new_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn new_z(&mut self) -> u64 {
        self.next_z += 1;
        self.next_z
    }

    fn build_text(&mut self, text: &str, left: f64, bottom: f64) -> String {
        let (sx, sy) = self.scale;
        format!(
            r#"<t id="{id}" p="{l} {b}" Z="{z}" LineHeight="auto"><s font="1000000" size="10" color="0">{text}</s></t>"#,
            id = self.new_id(),
            l = left * sx,
            b = bottom * sy,
            z = self.new_z(),
            text = escape(text),
        )
    }

    fn build_arrow(&mut self, arrow: &ArrowInput) -> String {
        let (sx, sy) = self.scale;
        let arrow_id = self.new_id();
        let graphic_id = self.new_id();
        let z = self.new_z();
        let (hx, hy) = (arrow.head.0 * sx, arrow.head.1 * sy);
        let (tx, ty) = (arrow.tail.0 * sx, arrow.tail.1 * sy);
        format!(
            r#"<graphic id="{graphic_id}" SupersededBy="{arrow_id}" BoundingBox="{hx} {hy} {tx} {ty}" Z="{z}" GraphicType="Line" ArrowType="FullHead" HeadSize="1000"/><arrow id="{arrow_id}" Z="{z}" FillType="None" ArrowheadHead="Full" ArrowheadType="Solid" HeadSize="1000" ArrowheadCenterSize="875" ArrowheadWidth="250" Head3D="{hx} {hy} 0" Tail3D="{tx} {ty} 0"/>"#,
        )
    }

    /// A drawn compound re-enters through its fragment cdxml: uniform
    /// width-derived scale, offset into the target box, then the document
    /// scale. A text-only compound that at least has a vector rendering
    /// falls back to a label at (left, vertical center).
    fn build_compound(&mut self, compound: &CompoundInput) -> Result<String, CdxmlError> {
        if !compound.cdxml.is_empty() {
            let cleaned = compound.cdxml.replace('\n', "").replace('\r', "");
            let mut fragment = XmlTree::parse(&cleaned)?;
            let root = fragment.root();
            let fragment_box = attr_box(&fragment, root)?
                .ok_or_else(|| CdxmlError::malformed("BoundingBox", ""))?;
            if fragment_box.width() == 0.0 {
                return Err(CdxmlError::malformed("BoundingBox", "zero width"));
            }

            let target_box = compound.bounds;
            // one ratio for both axes so the drawing keeps its aspect
            let factor = target_box.width() / fragment_box.width();
            let offset = (
                target_box.left - fragment_box.left * factor,
                target_box.top - fragment_box.top * factor,
            );
            apply_offset_scale(&mut fragment, root, offset, (factor, factor))?;
            apply_offset_scale(&mut fragment, root, (0.0, 0.0), self.scale)?;
            return fragment.serialize(root);
        }

        if compound.svg.is_some() {
            let left = compound.bounds.left;
            let bottom = compound.bounds.center().1;
            let text = compound.text.clone().unwrap_or_default();
            return Ok(self.build_text(&text, left, bottom));
        }

        Ok(String::new())
    }
}

/// Rebuild the CDXML document for a scheme.
pub fn build(data: &SchemeData) -> Result<String, CdxmlError> {
    SchemeBuilder::new(data)?.build()
}

fn missing(entity: &str, field: &str) -> CdxmlError {
    CdxmlError::MissingField {
        entity: entity.to_string(),
        field: field.to_string(),
    }
}

const TEMPLATE: &str = r##"<?xml version="1.0" encoding="UTF-8" ?><!DOCTYPE CDXML SYSTEM "http://www.cambridgesoft.com/xml/cdxml.dtd">
<CDXML CreationProgram="ChemDraw 20.0.0.38" Name="new.cdxml" WindowPosition="0 0" WindowSize="0 0" FractionalWidths="yes" InterpretChemically="yes" ShowAtomQuery="yes" ShowAtomStereo="no" ShowAtomEnhancedStereo="yes" ShowAtomNumber="no" ShowResidueID="no" ShowBondQuery="yes" ShowBondRxn="yes" ShowBondStereo="no" ShowTerminalCarbonLabels="no" ShowNonTerminalCarbonLabels="no" HideImplicitHydrogens="no" Magnification="666" LabelFont="174" LabelSize="10" LabelFace="96" CaptionFont="174" CaptionSize="10" HashSpacing="2.49" MarginWidth="1.59" LineWidth="0.60" BoldWidth="2.01" BondLength="14.40" BondSpacing="18" ChainAngle="120" LabelJustification="Auto" CaptionJustification="Left" AminoAcidTermini="HOH" ShowSequenceTermini="yes" ShowSequenceBonds="yes" ShowSequenceUnlinkedBranches="no" ResidueWrapCount="40" ResidueBlockCount="10" ResidueZigZag="yes" NumberResidueBlocks="no" PrintMargins="36 36 36 36" MacPrintInfo="0003000000480048000000000300024CFFF4FFF4030C02580367052803FC0002000000480048000000000300024C000100000064000000010001010100000001270F000100010000000000000000000000000002001901900000000000400000000000000000000100000000000000000000000000000000" ChemPropName="" ChemPropFormula="Chemical Formula: " ChemPropExactMass="Exact Mass: " ChemPropMolWt="Molecular Weight: " ChemPropMOverZ="m/z: " ChemPropAnalysis="Elemental Analysis: " ChemPropBoilingPt="Boiling Point: " ChemPropMeltingPt="Melting Point: " ChemPropCritTemp="Critical Temp: " ChemPropCritPres="Critical Pres: " ChemPropCritVol="Critical Vol: " ChemPropGibbs="Gibbs Energy: " ChemPropLogP="Log P: " ChemPropMR="MR: " ChemPropHenry="Henry&apos;s Law: " ChemPropEForm="Heat of Form: " ChemProptPSA="tPSA: " ChemPropID="" ChemPropFragmentLabel="" color="0" bgcolor="1" RxnAutonumberStart="1" RxnAutonumberConditions="no" RxnAutonumberStyle="Roman" RxnAutonumberFormat="(#)">
    <colortable>
        <color r="1" g="1" b="1"/>
        <color r="0" g="0" b="0"/>
        <color r="1" g="0" b="0"/>
        <color r="1" g="1" b="0"/>
        <color r="0" g="1" b="0"/>
        <color r="0" g="1" b="1"/>
        <color r="0" g="0" b="1"/>
        <color r="1" g="0" b="1"/>
    </colortable>
    <fonttable>
        <font id="1000000" charset="x-mac-roman" name="Arial"/>
    </fonttable>
    <page id="1000001" HeaderPosition="36" FooterPosition="36" PrintTrimMarks="yes" HeightPages="2" WidthPages="1">
        {content}
    </page>
</CDXML>
"##;
