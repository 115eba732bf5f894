/// STL model parser for binary and ASCII formats
use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::many0,
    number::complete::float,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use crate::error::StlError;
use crate::geometry::{Mesh, Triangle, Vertex};

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

fn read_vec3(bytes: &[u8]) -> (f32, f32, f32) {
    let f = |i: usize| f32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
    (f(0), f(4), f(8))
}

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Mesh, StlError> {
    if data.len() < HEADER_LEN + 4 {
        return Err(StlError::TooSmall);
    }

    let count_bytes = &data[HEADER_LEN..HEADER_LEN + 4];
    let triangle_count = u32::from_le_bytes([
        count_bytes[0],
        count_bytes[1],
        count_bytes[2],
        count_bytes[3],
    ]) as usize;

    let body = &data[HEADER_LEN + 4..];
    let mut mesh = Mesh::with_capacity(triangle_count.min(body.len() / FACET_LEN));

    for triangle in 0..triangle_count {
        let facet = body
            .get(triangle * FACET_LEN..(triangle + 1) * FACET_LEN)
            .ok_or(StlError::UnexpectedEof { triangle })?;

        let (nx, ny, nz) = read_vec3(&facet[0..12]);
        let vertex = |offset: usize| {
            let (x, y, z) = read_vec3(&facet[offset..offset + 12]);
            Vertex::new(x, y, z, nx, ny, nz)
        };
        // Trailing 2-byte attribute count is ignored.
        mesh.add_triangle(Triangle::new(vertex(12), vertex(24), vertex(36)));
    }

    Ok(mesh)
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Mesh, StlError> {
    match parse_ascii_stl_impl(input) {
        Ok((_, mesh)) => Ok(mesh),
        Err(e) => Err(StlError::Ascii(format!("{:?}", e))),
    }
}

fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(multispace0, tag(word))
}

fn parse_ascii_stl_impl(input: &str) -> IResult<&str, Mesh> {
    let (input, _) = pair(keyword("solid"), not_line_ending)(input)?;
    let (input, triangles) = many0(facet)(input)?;
    let (input, _) = keyword("endsolid")(input)?;

    let mut mesh = Mesh::with_capacity(triangles.len());
    for triangle in triangles {
        mesh.add_triangle(triangle);
    }
    Ok((input, mesh))
}

/// `facet normal n n n outer loop (vertex x y z){3} endloop endfacet`
fn facet(input: &str) -> IResult<&str, Triangle> {
    let (input, normal) = preceded(pair(keyword("facet"), keyword("normal")), vec3)(input)?;
    let (input, corners) = delimited(
        pair(keyword("outer"), keyword("loop")),
        tuple((vertex_line, vertex_line, vertex_line)),
        pair(keyword("endloop"), keyword("endfacet")),
    )(input)?;

    let corner = |(x, y, z): (f32, f32, f32)| Vertex::new(x, y, z, normal.0, normal.1, normal.2);
    Ok((input, Triangle::new(corner(corners.0), corner(corners.1), corner(corners.2))))
}

fn vertex_line(input: &str) -> IResult<&str, (f32, f32, f32)> {
    preceded(keyword("vertex"), vec3)(input)
}

fn vec3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    tuple((
        preceded(multispace0, float),
        preceded(multispace1, float),
        preceded(multispace1, float),
    ))(input)
}

/// Detect and parse STL file (binary or ASCII)
///
/// Binary files may also start with `solid`, so a failed ASCII parse falls
/// back to the binary reader.
pub fn parse_stl(data: &[u8]) -> Result<Mesh, StlError> {
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            match parse_ascii_stl(text) {
                Ok(mesh) => return Ok(mesh),
                Err(e) => log::warn!("{}; retrying as binary STL", e),
            }
        }
    }

    parse_binary_stl(data)
}
