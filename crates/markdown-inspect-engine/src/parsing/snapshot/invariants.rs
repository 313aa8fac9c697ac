use crate::models::Document;

pub fn check(doc: &Document) {
    let n = doc.offsets().total_len();
    assert_eq!(
        doc.source().chars().count(),
        n,
        "source length disagrees with offset index"
    );

    let mut previous_end = 0;
    for s in doc.sentences() {
        assert!(
            s.span.start <= s.span.end && s.span.end <= n,
            "sentence span out of bounds: {:?} (document len: {})",
            s.span,
            n
        );
        assert!(
            s.span.start >= previous_end,
            "sentence {:?} overlaps its predecessor ending at {}",
            s.span,
            previous_end
        );
        previous_end = s.span.end;

        assert_eq!(
            s.offset_map.len(),
            s.content.chars().count(),
            "offset map does not cover content of {:?}",
            s.content
        );
        assert_eq!(
            doc.position(s.span.start),
            Some(s.position),
            "stored position disagrees with offset index"
        );
        for t in &s.tokens {
            assert!(
                t.span.start >= s.span.start && t.span.end <= s.span.end,
                "token {:?} outside sentence span {:?}",
                t.span,
                s.span
            );
        }
    }
}
