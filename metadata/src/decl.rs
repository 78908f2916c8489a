//! Type declarations as handed over by the source analyzer, and the reader for
//! the XML document the analyzer writes them to.
//!
//! ```xml
//! <package name="model">
//!   <type name="User">
//!     <struct>
//!       <field>
//!         <name>ID</name>
//!         <tag>`json:"id"`</tag>
//!         <doc>ID is the primary key.</doc>
//!         <ident name="int64"/>
//!       </field>
//!     </struct>
//!   </type>
//! </package>
//! ```

use roxmltree::Node;
use thiserror::Error;

use crate::{
    error::MetadataError,
    type_expr::{TypeExpr, TypeShape},
};

#[derive(Debug, Error)]
pub enum DeclarationError {
    #[error("declarations are not well-formed XML")]
    Xml(#[from] roxmltree::Error),

    #[error("expected <{expected}>, found <{found}>")]
    UnexpectedElement {
        expected: &'static str,
        found: String,
    },

    #[error("<{element}> is missing the `{attribute}` attribute")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("<{0}> is missing a type expression")]
    MissingTypeExpression(String),
}

/// All type declarations of one package, in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Package {
    pub name: Option<String>,
    pub declarations: Vec<Declaration>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub body: DeclarationBody,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeclarationBody {
    Struct(StructType),
    /// Aliases, named basic types, interfaces, ...
    Other(TypeExpr),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StructType {
    pub fields: Vec<FieldDecl>,
}

/// A single field line of a struct. `A, B int` is one `FieldDecl` with two names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDecl {
    pub names: FieldNames,
    pub type_expr: TypeExpr,
    /// The tag literal including its delimiters, e.g. `` `json:"id"` ``.
    pub tag: Option<String>,
    pub doc: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldNames {
    /// No explicit name; the field is named after its type.
    Embedded,
    Named(Vec<String>),
}

impl Declaration {
    pub fn struct_type(&self) -> Result<&StructType, MetadataError> {
        match &self.body {
            DeclarationBody::Struct(struct_type) => Ok(struct_type),
            DeclarationBody::Other(_) => {
                Err(MetadataError::NotAStructDeclaration(self.name.clone()))
            }
        }
    }
}

impl FieldDecl {
    pub fn shape(&self) -> TypeShape {
        TypeShape::of(&self.type_expr)
    }
}

fn expect_tag(node: Node, expected: &'static str) -> Result<(), DeclarationError> {
    if node.tag_name().name() == expected {
        Ok(())
    } else {
        Err(DeclarationError::UnexpectedElement {
            expected,
            found: node.tag_name().name().to_string(),
        })
    }
}

fn required_attribute<'a>(
    node: Node<'a, '_>,
    attribute: &'static str,
) -> Result<&'a str, DeclarationError> {
    node.attribute(attribute)
        .ok_or_else(|| DeclarationError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute,
        })
}

fn child_elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|c| c.is_element())
}

fn text_of(node: Node) -> String {
    node.text().unwrap_or_default().to_string()
}

impl Package {
    pub const TAG_NAME: &'static str = "package";

    pub fn parse(text: &str) -> Result<Self, DeclarationError> {
        let document = roxmltree::Document::parse(text)?;
        Self::map_from_xml(document.root_element())
    }

    pub fn map_from_xml(package: Node) -> Result<Self, DeclarationError> {
        expect_tag(package, Self::TAG_NAME)?;

        let declarations = child_elements(package)
            .filter(|c| c.tag_name().name() == Declaration::TAG_NAME)
            .map(Declaration::map_from_xml)
            .collect::<Result<_, _>>()?;

        Ok(Self {
            name: package.attribute("name").map(str::to_string),
            declarations,
        })
    }
}

impl Declaration {
    pub const TAG_NAME: &'static str = "type";

    pub fn map_from_xml(declaration: Node) -> Result<Self, DeclarationError> {
        expect_tag(declaration, Self::TAG_NAME)?;
        let name = required_attribute(declaration, "name")?.to_string();

        let body = child_elements(declaration)
            .find(|c| c.tag_name().name() != "doc")
            .ok_or_else(|| DeclarationError::MissingTypeExpression(Self::TAG_NAME.into()))?;

        let body = if body.tag_name().name() == StructType::TAG_NAME {
            DeclarationBody::Struct(StructType::map_from_xml(body)?)
        } else {
            DeclarationBody::Other(type_expr_from_xml(body)?)
        };

        Ok(Self { name, body })
    }
}

impl StructType {
    pub const TAG_NAME: &'static str = "struct";

    pub fn map_from_xml(struct_type: Node) -> Result<Self, DeclarationError> {
        expect_tag(struct_type, Self::TAG_NAME)?;
        let fields = child_elements(struct_type)
            .map(FieldDecl::map_from_xml)
            .collect::<Result<_, _>>()?;
        Ok(Self { fields })
    }
}

impl FieldDecl {
    pub const TAG_NAME: &'static str = "field";

    pub fn map_from_xml(field: Node) -> Result<Self, DeclarationError> {
        expect_tag(field, Self::TAG_NAME)?;

        let mut names = Vec::new();
        let mut tag = None;
        let mut doc = String::new();
        let mut type_expr = None;
        for child in child_elements(field) {
            match child.tag_name().name() {
                "name" => names.push(text_of(child)),
                "tag" => tag = Some(text_of(child).trim().to_string()),
                "doc" => doc = text_of(child),
                _ if type_expr.is_none() => type_expr = Some(type_expr_from_xml(child)?),
                other => {
                    return Err(DeclarationError::UnexpectedElement {
                        expected: "name, tag or doc",
                        found: other.to_string(),
                    })
                }
            }
        }

        let type_expr = type_expr
            .ok_or_else(|| DeclarationError::MissingTypeExpression(Self::TAG_NAME.into()))?;
        let names = if names.is_empty() {
            FieldNames::Embedded
        } else {
            FieldNames::Named(names)
        };

        Ok(Self {
            names,
            type_expr,
            tag,
            doc,
        })
    }
}

/// Reads exactly `N` type expressions from the children of `node`.
fn operands<const N: usize>(node: Node) -> Result<[TypeExpr; N], DeclarationError> {
    let operands = child_elements(node)
        .map(type_expr_from_xml)
        .collect::<Result<Vec<_>, _>>()?;
    operands
        .try_into()
        .map_err(|_| DeclarationError::MissingTypeExpression(node.tag_name().name().to_string()))
}

/// Reads a type expression. Unknown elements become [`TypeExpr::Unresolvable`];
/// failing on them is left to the resolvers.
pub fn type_expr_from_xml(node: Node) -> Result<TypeExpr, DeclarationError> {
    let expr = match node.tag_name().name() {
        "ident" => TypeExpr::named(required_attribute(node, "name")?),
        "selector" => {
            let name = required_attribute(node, "name")?;
            let [path] = operands(node)?;
            TypeExpr::qualified(path, name)
        }
        "pointer" => {
            let [inner] = operands(node)?;
            TypeExpr::pointer(inner)
        }
        // fixed-length arrays render like slices
        "slice" | "array" => {
            let [element] = operands(node)?;
            TypeExpr::slice(element)
        }
        "map" => {
            let [key, value] = operands(node)?;
            TypeExpr::map(key, value)
        }
        "struct" => TypeExpr::AnonymousRecord,
        other => TypeExpr::Unresolvable(other.to_string()),
    };
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <package name="model">
          <type name="User">
            <doc>User is a person.</doc>
            <struct>
              <field>
                <name>ID</name>
                <tag>`json:"id"`</tag>
                <doc>ID is the primary key.
</doc>
                <ident name="int64"/>
              </field>
              <field>
                <pointer><selector name="Base"><ident name="pkg"/></selector></pointer>
              </field>
              <field>
                <name>First</name>
                <name>Last</name>
                <ident name="string"/>
              </field>
            </struct>
          </type>
          <type name="Kind"><ident name="string"/></type>
        </package>
    "#;

    #[test]
    fn reads_package() {
        let package = Package::parse(SAMPLE).unwrap();
        assert_eq!(package.name.as_deref(), Some("model"));
        assert_eq!(package.declarations.len(), 2);

        let user = &package.declarations[0];
        let fields = &user.struct_type().unwrap().fields;
        assert_eq!(fields.len(), 3);

        assert_eq!(fields[0].names, FieldNames::Named(vec!["ID".into()]));
        assert_eq!(fields[0].tag.as_deref(), Some(r#"`json:"id"`"#));
        assert_eq!(fields[0].doc, "ID is the primary key.\n");
        assert_eq!(fields[0].type_expr, TypeExpr::named("int64"));

        assert_eq!(fields[1].names, FieldNames::Embedded);
        assert_eq!(
            fields[1].type_expr,
            TypeExpr::pointer(TypeExpr::qualified(TypeExpr::named("pkg"), "Base"))
        );
        assert!(fields[1].shape().ptr);

        assert_eq!(
            fields[2].names,
            FieldNames::Named(vec!["First".into(), "Last".into()])
        );
    }

    #[test]
    fn indented_tag_text_is_trimmed() {
        let package = Package::parse(
            r#"<package><type name="T"><struct>
                 <field>
                   <name>A</name>
                   <tag>
                     `json:"a"`
                   </tag>
                   <ident name="int"/>
                 </field>
               </struct></type></package>"#,
        )
        .unwrap();
        let field = &package.declarations[0].struct_type().unwrap().fields[0];
        assert_eq!(field.tag.as_deref(), Some(r#"`json:"a"`"#));
    }

    #[test]
    fn non_struct_declaration() {
        let package = Package::parse(SAMPLE).unwrap();
        let kind = &package.declarations[1];
        assert_eq!(kind.body, DeclarationBody::Other(TypeExpr::named("string")));
        assert!(matches!(
            kind.struct_type(),
            Err(MetadataError::NotAStructDeclaration(name)) if name == "Kind"
        ));
    }

    #[test]
    fn unknown_shapes_are_kept() {
        let doc =
            roxmltree::Document::parse(r#"<map><ident name="string"/><chan/></map>"#).unwrap();
        let expr = type_expr_from_xml(doc.root_element()).unwrap();
        assert_eq!(
            expr,
            TypeExpr::map(TypeExpr::named("string"), TypeExpr::Unresolvable("chan".into()))
        );
    }

    #[test]
    fn arrays_read_as_slices() {
        let doc =
            roxmltree::Document::parse(r#"<array len="4"><ident name="byte"/></array>"#).unwrap();
        let expr = type_expr_from_xml(doc.root_element()).unwrap();
        assert_eq!(expr, TypeExpr::slice(TypeExpr::named("byte")));
    }

    #[test]
    fn malformed_documents() {
        assert!(matches!(
            Package::parse("<types/>"),
            Err(DeclarationError::UnexpectedElement { expected: "package", .. })
        ));
        assert!(matches!(
            Package::parse(r#"<package><type><ident name="x"/></type></package>"#),
            Err(DeclarationError::MissingAttribute { attribute: "name", .. })
        ));
        assert!(matches!(
            Package::parse(
                r#"<package><type name="T"><struct>
                     <field><name>A</name></field>
                   </struct></type></package>"#
            ),
            Err(DeclarationError::MissingTypeExpression(element)) if element == "field"
        ));
        assert!(matches!(
            Package::parse(
                r#"<package><type name="T"><map><ident name="K"/></map></type></package>"#
            ),
            Err(DeclarationError::MissingTypeExpression(element)) if element == "map"
        ));
        assert!(matches!(Package::parse("<package>"), Err(DeclarationError::Xml(_))));
    }
}
