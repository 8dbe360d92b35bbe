/// Scene description decoding.
///
/// A description is a list of statements terminated by `;`, each a list of
/// comma-separated fields led by a one-letter type code:
///
/// ```text
/// c,myCamera,perspective,7,7,7,0,0,0,0,1,0;
/// l,myLight,point,-4,5,-4,1.2,1.2,1.2;
/// p,unitSphere,sphere,20,20;
/// m,globeMat,1,1,1,0.7,0.7,0.7,1,1,1,5,sun.png;
/// o,globe,unitSphere,globeMat;
/// X,globe,S,1.5,1.5,1.5;X,globe,Rx,90;
/// ```
///
/// Whitespace around fields and statements is insignificant.
use nom::{
    bytes::complete::take_till,
    character::complete::char,
    combinator::{all_consuming, map},
    multi::{many0, separated_list1},
    number::complete::float,
    sequence::terminated,
    IResult,
};

use crate::error::DescriptionError;
use crate::transform::Instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Perspective,
    Orthographic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraStatement {
    pub name: String,
    pub projection: Projection,
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub up: [f32; 3],
}

/// Light source parameters; carried through the scene, never evaluated here
#[derive(Debug, Clone, PartialEq)]
pub struct LightStatement {
    pub name: String,
    pub kind: String,
    pub position: [f32; 3],
    pub intensity: [f32; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveStatement {
    pub name: String,
    pub kind: String,
    pub params: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialStatement {
    pub name: String,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
    pub texture: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectStatement {
    pub name: String,
    pub primitive: String,
    pub material: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformStatement {
    pub object: String,
    pub instruction: Instruction,
}

/// One decoded statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Camera(CameraStatement),
    Light(LightStatement),
    Primitive(PrimitiveStatement),
    Material(MaterialStatement),
    Object(ObjectStatement),
    Transform(TransformStatement),
}

/// Parse a full scene description into statements, in declaration order
pub fn parse_description(input: &str) -> Result<Vec<Statement>, DescriptionError> {
    let raw = split_statements(input).map_err(|e| DescriptionError::Syntax {
        statement: 1,
        message: format!("{:?}", e),
    })?;

    raw.iter()
        .filter(|fields| fields.iter().any(|f| !f.is_empty()))
        .enumerate()
        .map(|(i, fields)| decode_statement(i + 1, fields))
        .collect()
}

/// Decode the fields of a single statement, without its terminator
pub fn parse_statement(input: &str) -> Result<Statement, DescriptionError> {
    let (_, fields) = fields(input).map_err(|e| DescriptionError::Syntax {
        statement: 1,
        message: format!("{:?}", e),
    })?;
    decode_statement(1, &fields)
}

fn field(input: &str) -> IResult<&str, &str> {
    map(take_till(|c: char| c == ',' || c == ';'), str::trim)(input)
}

fn fields(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(char(','), field)(input)
}

fn split_statements(input: &str) -> Result<Vec<Vec<&str>>, nom::Err<nom::error::Error<&str>>> {
    let (rest, mut statements) = many0(terminated(fields, char(';')))(input)?;
    // The final statement may omit its terminator
    if !rest.trim().is_empty() {
        let (_, last) = all_consuming(fields)(rest)?;
        statements.push(last);
    }
    Ok(statements)
}

/// Cursor over the fields of one statement
struct Fields<'a> {
    statement: usize,
    fields: &'a [&'a str],
    next: usize,
}

impl<'a> Fields<'a> {
    fn new(statement: usize, fields: &'a [&'a str]) -> Self {
        Self {
            statement,
            fields,
            next: 0,
        }
    }

    fn text(&mut self, name: &'static str) -> Result<&'a str, DescriptionError> {
        match self.fields.get(self.next) {
            Some(&value) if !value.is_empty() => {
                self.next += 1;
                Ok(value)
            }
            _ => Err(DescriptionError::MissingField {
                statement: self.statement,
                field: name,
            }),
        }
    }

    fn number(&mut self, name: &'static str) -> Result<f32, DescriptionError> {
        let value = self.text(name)?;
        parse_number(self.statement, name, value)
    }

    fn vec3(&mut self, name: &'static str) -> Result<[f32; 3], DescriptionError> {
        Ok([self.number(name)?, self.number(name)?, self.number(name)?])
    }

    fn optional_text(&mut self) -> Option<&'a str> {
        let value = self.fields.get(self.next).copied().filter(|v| !v.is_empty());
        self.next += 1;
        value
    }

    fn remaining_numbers(&mut self, name: &'static str) -> Result<Vec<f32>, DescriptionError> {
        let rest = self.fields.get(self.next..).unwrap_or(&[]);
        self.next = self.fields.len();
        rest.iter()
            .filter(|v| !v.is_empty())
            .map(|v| parse_number(self.statement, name, v))
            .collect()
    }
}

fn parse_number(statement: usize, field: &'static str, value: &str) -> Result<f32, DescriptionError> {
    all_consuming(float::<&str, nom::error::Error<&str>>)(value)
        .map(|(_, n)| n)
        .map_err(|_| DescriptionError::InvalidNumber {
            statement,
            field,
            value: value.to_string(),
        })
}

fn decode_statement(statement: usize, raw: &[&str]) -> Result<Statement, DescriptionError> {
    let mut f = Fields::new(statement, raw);
    let code = f.text("type")?;

    let decoded = match code {
        "c" => {
            let name = f.text("name")?.to_string();
            let projection = match f.text("projection")?.to_ascii_lowercase().as_str() {
                "perspective" => Projection::Perspective,
                "orthographic" => Projection::Orthographic,
                other => {
                    return Err(DescriptionError::Syntax {
                        statement,
                        message: format!("unknown projection '{}'", other),
                    })
                }
            };
            Statement::Camera(CameraStatement {
                name,
                projection,
                eye: f.vec3("eye")?,
                target: f.vec3("target")?,
                up: f.vec3("up")?,
            })
        }
        "l" => Statement::Light(LightStatement {
            name: f.text("name")?.to_string(),
            kind: f.text("kind")?.to_string(),
            position: f.vec3("position")?,
            intensity: f.vec3("intensity")?,
        }),
        "p" => Statement::Primitive(PrimitiveStatement {
            name: f.text("name")?.to_string(),
            kind: f.text("kind")?.to_string(),
            params: f.remaining_numbers("parameter")?,
        }),
        "m" => Statement::Material(MaterialStatement {
            name: f.text("name")?.to_string(),
            ambient: f.vec3("ka")?,
            diffuse: f.vec3("kd")?,
            specular: f.vec3("ks")?,
            shininess: f.number("shininess")?,
            texture: f.optional_text().map(str::to_string),
        }),
        "o" => Statement::Object(ObjectStatement {
            name: f.text("name")?.to_string(),
            primitive: f.text("primitive")?.to_string(),
            material: f.text("material")?.to_string(),
        }),
        "X" => {
            let object = f.text("object")?.to_string();
            let tag = f.text("instruction")?;
            let values = f.remaining_numbers("value")?;
            let instruction = Instruction::from_fields(tag, &values).ok_or(
                DescriptionError::MissingField {
                    statement,
                    field: "value",
                },
            )?;
            Statement::Transform(TransformStatement {
                object,
                instruction,
            })
        }
        other => {
            return Err(DescriptionError::UnknownStatement {
                statement,
                code: other.to_string(),
            })
        }
    };

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLOBE: &str = "
        c,myCamera,perspective,7,7,7,0,0,0,0,1,0;
        l,myLight,point,-4,5,-4,1.2,1.2,1.2;
        p,unitCube,cube;
        p,unitSphere,sphere,20,20;
        m,globeMat,1,1,1,0.7,0.7,0.7,1,1,1,5,sun.png;
        o,gl,unitSphere,globeMat;
        X,gl,S,1.5,1.5,1.5;X,gl,Rx,90;X,gl,Ry,-150;X,gl,T,-2,4,-1;
    ";

    #[test]
    fn test_parse_full_description() {
        let statements = parse_description(GLOBE).unwrap();
        assert_eq!(statements.len(), 10);

        assert_eq!(
            statements[0],
            Statement::Camera(CameraStatement {
                name: "myCamera".to_string(),
                projection: Projection::Perspective,
                eye: [7.0, 7.0, 7.0],
                target: [0.0, 0.0, 0.0],
                up: [0.0, 1.0, 0.0],
            })
        );
        assert_eq!(
            statements[3],
            Statement::Primitive(PrimitiveStatement {
                name: "unitSphere".to_string(),
                kind: "sphere".to_string(),
                params: vec![20.0, 20.0],
            })
        );
        assert_eq!(
            statements[9],
            Statement::Transform(TransformStatement {
                object: "gl".to_string(),
                instruction: Instruction::Translate(-2.0, 4.0, -1.0),
            })
        );
    }

    #[test]
    fn test_material_fields() {
        let statement = parse_statement("m,dirt,0.3,0.3,0.3,0.7,0.7,0.7,1,1,1,5, largetopdirt.png").unwrap();
        match statement {
            Statement::Material(m) => {
                assert_eq!(m.ambient, [0.3, 0.3, 0.3]);
                assert_eq!(m.diffuse, [0.7, 0.7, 0.7]);
                assert_eq!(m.shininess, 5.0);
                assert_eq!(m.texture.as_deref(), Some("largetopdirt.png"));
            }
            other => panic!("expected material, got {:?}", other),
        }

        let untextured = parse_statement("m,plain,1,1,1,1,1,1,1,1,1,10").unwrap();
        assert!(matches!(untextured, Statement::Material(MaterialStatement { texture: None, .. })));
    }

    #[test]
    fn test_whitespace_and_missing_terminator() {
        let statements = parse_description("X,d1,Ry,0; X,d1,T,2,-1,0 ;\n\nX,d1,S,0.5,0.5,0.5").unwrap();
        assert_eq!(statements.len(), 3);
        assert_eq!(
            statements[1],
            Statement::Transform(TransformStatement {
                object: "d1".to_string(),
                instruction: Instruction::Translate(2.0, -1.0, 0.0),
            })
        );
    }

    #[test]
    fn test_empty_statements_are_skipped() {
        assert!(parse_description("").unwrap().is_empty());
        assert_eq!(parse_description(";; p,c,cube;").unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_instruction_tag_is_kept() {
        let statement = parse_statement("X,gl,Sh,1,2").unwrap();
        assert_eq!(
            statement,
            Statement::Transform(TransformStatement {
                object: "gl".to_string(),
                instruction: Instruction::Unknown("Sh".to_string()),
            })
        );
    }

    #[test]
    fn test_unknown_statement_code() {
        let err = parse_description("p,unitCube,cube;z,what;").unwrap_err();
        assert_eq!(
            err,
            DescriptionError::UnknownStatement {
                statement: 2,
                code: "z".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_number() {
        let err = parse_statement("X,gl,T,1,two,3").unwrap_err();
        assert_eq!(
            err,
            DescriptionError::InvalidNumber {
                statement: 1,
                field: "value",
                value: "two".to_string()
            }
        );
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            parse_statement("o,gl,unitSphere").unwrap_err(),
            DescriptionError::MissingField {
                statement: 1,
                field: "material"
            }
        );
        assert_eq!(
            parse_statement("X,gl,T,1,2").unwrap_err(),
            DescriptionError::MissingField {
                statement: 1,
                field: "value"
            }
        );
    }

    #[test]
    fn test_unknown_projection() {
        assert!(matches!(
            parse_statement("c,cam,fisheye,0,0,5,0,0,0,0,1,0"),
            Err(DescriptionError::Syntax { .. })
        ));
    }
}
