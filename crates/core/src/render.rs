//! Front and back matter that is generated rather than converted.

use std::fmt::Write as _;

use crate::context::{Context, ContextStack};
use crate::metadata::{Author, Metadata, Reference};

/// XML declaration and processing instructions written by `.. header::`.
pub const PROLOGUE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
  <?xml-stylesheet type="text/xsl" href="rfc2629.xslt"?>
  <!-- generated by rst2rfcxml -->

<!DOCTYPE rfc [
]>

<?rfc rfcedstyle="yes"?>
<?rfc toc="yes"?>
<?rfc tocindent="yes"?>
<?rfc sortrefs="yes"?>
<?rfc symrefs="yes"?>
<?rfc strict="yes"?>
<?rfc comments="yes"?>
<?rfc inline="yes"?>
<?rfc text-list-symbols="-o*+"?>
<?rfc docmapping="yes"?>

"#;

fn attribute(value: &str) -> String {
    value.replace('"', "&quot;")
}

/// Write one `<author>` element whose opening tag sits at `depth`.
pub fn write_author(out: &mut String, depth: usize, author: &Author) {
    let pad = |extra: usize| " ".repeat(depth + extra);

    let mut open = String::from("<author");
    let attributes = [
        ("initials", &author.initials),
        ("asciiInitials", &author.ascii_initials),
        ("surname", &author.surname),
        ("asciiSurname", &author.ascii_surname),
        ("fullname", &author.fullname),
        ("role", &author.role),
        ("asciiFullname", &author.ascii_fullname),
    ];
    for (name, value) in attributes {
        if !value.is_empty() {
            write!(open, " {name}=\"{}\"", attribute(value)).ok();
        }
    }
    open.push('>');
    writeln!(out, "{}{open}", pad(0)).ok();

    if !author.organization.is_empty() {
        writeln!(
            out,
            "{}<organization>{}</organization>",
            pad(2),
            author.organization
        )
        .ok();
    }

    if author.has_address() {
        writeln!(out, "{}<address>", pad(1)).ok();
        if author.has_postal() {
            writeln!(out, "{}<postal>", pad(2)).ok();
            for line in &author.postal_lines {
                writeln!(out, "{}<postalLine>{line}</postalLine>", pad(2)).ok();
            }
            let fields = [
                ("city", &author.city),
                ("code", &author.code),
                ("country", &author.country),
                ("region", &author.region),
                ("street", &author.street),
            ];
            for (tag, value) in fields {
                if !value.is_empty() {
                    writeln!(out, "{}<{tag}>{value}</{tag}>", pad(2)).ok();
                }
            }
            writeln!(out, "{}</postal>", pad(2)).ok();
        }
        if !author.phone.is_empty() {
            writeln!(out, "{}<phone>{}</phone>", pad(2), author.phone).ok();
        }
        if !author.email.is_empty() {
            writeln!(out, "{}<email>{}</email>", pad(2), author.email).ok();
        }
        writeln!(out, "{}</address>", pad(1)).ok();
    }

    writeln!(out, "{}</author>", pad(0)).ok();
}

/// Prefix relative targets (no scheme) with the base URI.
fn resolve_target(target: &str, base_uri: &str) -> String {
    if target.contains("://") || base_uri.is_empty() {
        target.to_string()
    } else {
        format!("{}/{}", base_uri.trim_end_matches('/'), target)
    }
}

fn write_reference(out: &mut String, depth: usize, reference: &Reference, base_uri: &str) {
    let pad = |extra: usize| " ".repeat(depth + extra);

    let mut open = format!("<reference anchor=\"{}\"", attribute(&reference.anchor));
    if !reference.target.is_empty() {
        let target = resolve_target(&reference.target, base_uri);
        write!(open, " target=\"{}\"", attribute(&target)).ok();
    }
    open.push('>');
    writeln!(out, "{}{open}", pad(0)).ok();
    writeln!(out, "{}<front>", pad(1)).ok();
    writeln!(out, "{}<title>{}</title>", pad(2), reference.title).ok();
    writeln!(out, "{}<author></author>", pad(2)).ok();
    writeln!(out, "{}</front>", pad(1)).ok();
    if !reference.series_info_name.is_empty() {
        writeln!(
            out,
            "{}<seriesInfo name=\"{}\" value=\"{}\"/>",
            pad(1),
            attribute(&reference.series_info_name),
            attribute(&reference.series_info_value)
        )
        .ok();
    }
    writeln!(out, "{}</reference>", pad(0)).ok();
}

/// Write the normative and informative reference lists.
///
/// Only references cited at least once are listed; a list with no cited
/// entries is left out entirely.
pub fn write_references(
    out: &mut String,
    stack: &mut ContextStack,
    metadata: &Metadata,
    base_uri: &str,
) {
    let lists = [
        ("normative", "Normative References"),
        ("informative", "Informative References"),
    ];
    for (kind, name) in lists {
        let cited: Vec<&Reference> = metadata
            .references()
            .filter(|reference| reference.use_count > 0 && reference.kind == kind)
            .collect();
        if cited.is_empty() {
            continue;
        }

        stack.push(out, Context::References);
        stack.write_line(out, &format!("<name>{name}</name>"));
        for reference in cited {
            write_reference(out, stack.depth(), reference, base_uri);
        }
        stack.pop(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::ReferenceResolver;
    use crate::metadata::parse_assignment;

    fn metadata(lines: &[&str]) -> Metadata {
        let mut metadata = Metadata::new();
        for line in lines {
            let assignment = parse_assignment(line).unwrap();
            assert!(metadata.assign(&assignment), "{line}");
        }
        metadata
    }

    #[test]
    fn author_with_full_address() {
        let metadata = metadata(&[
            ".. |author[jd].fullname| replace:: John Doe",
            ".. |author[jd].surname| replace:: Doe",
            ".. |author[jd].initials| replace:: J.",
            ".. |author[jd].organization| replace:: ACME",
            ".. |author[jd].city| replace:: Anytown",
            ".. |author[jd].email| replace:: jd@example.com",
        ]);
        let mut out = String::new();
        write_author(&mut out, 2, &metadata.authors()[0]);
        assert_eq!(
            out,
            "  <author initials=\"J.\" surname=\"Doe\" fullname=\"John Doe\">\n\
             \x20   <organization>ACME</organization>\n\
             \x20  <address>\n\
             \x20   <postal>\n\
             \x20   <city>Anytown</city>\n\
             \x20   </postal>\n\
             \x20   <email>jd@example.com</email>\n\
             \x20  </address>\n\
             \x20 </author>\n"
        );
    }

    #[test]
    fn author_without_address() {
        let metadata = metadata(&[".. |author[x].fullname| replace:: X"]);
        let mut out = String::new();
        write_author(&mut out, 0, &metadata.authors()[0]);
        assert_eq!(out, "<author fullname=\"X\">\n</author>\n");
    }

    #[test]
    fn relative_targets_get_the_base() {
        assert_eq!(
            resolve_target("doc.html", "https://example.com/"),
            "https://example.com/doc.html"
        );
        assert_eq!(
            resolve_target("https://other.example", "https://example.com"),
            "https://other.example"
        );
        assert_eq!(resolve_target("doc.html", ""), "doc.html");
    }

    #[test]
    fn only_cited_references_are_listed() {
        let mut metadata = metadata(&[
            ".. |ref[A].title| replace:: Alpha",
            ".. |ref[A].target| replace:: https://a.example",
            ".. |ref[A].type| replace:: normative",
            ".. |ref[A].seriesInfoName| replace:: RFC",
            ".. |ref[A].seriesInfoValue| replace:: 1",
            ".. |ref[B].title| replace:: Beta",
            ".. |ref[B].target| replace:: https://b.example",
            ".. |ref[B].type| replace:: informative",
        ]);
        metadata.resolve("https://a.example");

        let mut out = String::new();
        let mut stack = ContextStack::new();
        write_references(&mut out, &mut stack, &metadata, "");
        assert_eq!(
            out,
            "<references>\n\
             \x20<name>Normative References</name>\n\
             \x20<reference anchor=\"A\" target=\"https://a.example\">\n\
             \x20 <front>\n\
             \x20  <title>Alpha</title>\n\
             \x20  <author></author>\n\
             \x20 </front>\n\
             \x20 <seriesInfo name=\"RFC\" value=\"1\"/>\n\
             \x20</reference>\n\
             </references>\n"
        );
        assert_eq!(stack.depth(), 0);
    }
}
